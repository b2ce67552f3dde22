// src/handlers/financials.rs
use chrono::{NaiveDate, Utc};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::farm::FarmClient;
use crate::services::finance::{
    aggregate_by_date, collect_events, filter_range, project_forecast, summarize,
    upcoming_month_labels, RandomJitter,
};

/// Forecast horizon shown on the dashboard.
const FORECAST_PERIODS: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Date inputs arrive as `yyyy-mm-dd` or empty strings; anything else is
/// treated as an unbounded side rather than an error.
fn parse_bound(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

pub async fn get_financials(query: RangeQuery, farm: Arc<FarmClient>) -> Result<Json, Rejection> {
    info!("Handling request to get financial dashboard data");

    let flocks = farm.list_flocks().await.map_err(|e| {
        error!("Failed to fetch flocks from farm backend: {:#}", e);
        warp::reject::custom(ApiError::upstream("Failed to load financial data"))
    })?;

    let (sale_events, expense_events) = collect_events(&flocks);
    let series = aggregate_by_date(&sale_events, &expense_events);

    let start = parse_bound(&query.start_date);
    let end = parse_bound(&query.end_date);
    let filtered = filter_range(&series, start, end);

    let summary = summarize(&filtered);
    let labels = upcoming_month_labels(Utc::now().date_naive(), FORECAST_PERIODS);
    let forecast = project_forecast(&filtered, &labels, &mut RandomJitter);

    info!(
        "Financial dashboard computed: {} dates in range, total revenue {:.2}",
        filtered.len(),
        summary.total_revenue
    );

    Ok(warp::reply::json(&json!({
        "series": filtered,
        "summary": summary,
        "forecast": forecast,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_parse_iso_dates() {
        let query = RangeQuery {
            start_date: Some("2024-01-05".to_string()),
            end_date: None,
        };
        assert_eq!(
            parse_bound(&query.start_date),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_bound(&query.end_date), None);
    }

    #[test]
    fn empty_or_malformed_bounds_are_unbounded() {
        assert_eq!(parse_bound(&Some("".to_string())), None);
        assert_eq!(parse_bound(&Some("01/05/2024".to_string())), None);
    }
}

// src/handlers/insights.rs
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::Flock;
use crate::services::insights::InsightsClient;

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub flock_data: Option<Flock>,
}

pub async fn post_insights(
    request: InsightRequest,
    insights: Arc<InsightsClient>,
) -> Result<Json, Rejection> {
    info!("Handling request to generate an AI insight");

    let flock = request
        .flock_data
        .ok_or_else(|| warp::reject::custom(ApiError::bad_request("Missing flock data")))?;

    // generate() falls back internally, so this handler never 500s on a
    // misbehaving model.
    let result = insights.generate(&flock).await;
    Ok(warp::reply::json(&json!({ "result": result })))
}

// src/routes.rs
use log::info;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{financials, flocks, insights, logs, records};
use crate::services::farm::{FarmClient, LogKind};
use crate::services::insights::InsightsClient;

/// Full flock payloads (insight requests) can carry months of logs.
const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid request body".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

fn log_routes(
    kind: LogKind,
    farm: Arc<FarmClient>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let farm_filter = warp::any().map(move || farm.clone());

    let collection = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("flocks"))
        .and(warp::path::param::<u32>())
        .and(warp::path(kind.segment()));

    let list_route = collection
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(farm_filter.clone())
        .and_then(move |flock_id, farm| logs::list_logs(flock_id, kind, farm));

    let create_route = collection
        .clone()
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(move |flock_id, body, farm| logs::create_log(flock_id, kind, body, farm));

    let update_route = collection
        .clone()
        .and(warp::path::param::<u32>())
        .and(warp::path::end())
        .and(warp::put())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(move |flock_id, log_id, body, farm| {
            logs::update_log(flock_id, kind, log_id, body, farm)
        });

    let delete_route = collection
        .and(warp::path::param::<u32>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(farm_filter)
        .and_then(move |flock_id, log_id, farm| logs::delete_log(flock_id, kind, log_id, farm));

    list_route.or(create_route).or(update_route).or(delete_route)
}

fn flock_routes(
    farm: Arc<FarmClient>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let farm_filter = warp::any().map(move || farm.clone());

    let list_route = warp::path!("api" / "v1" / "flocks")
        .and(warp::get())
        .and(farm_filter.clone())
        .and_then(flocks::list_flocks);

    let create_route = warp::path!("api" / "v1" / "flocks")
        .and(warp::post())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(flocks::create_flock);

    let get_route = warp::path!("api" / "v1" / "flocks" / u32)
        .and(warp::get())
        .and(farm_filter.clone())
        .and_then(flocks::get_flock);

    let update_route = warp::path!("api" / "v1" / "flocks" / u32)
        .and(warp::put())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(flocks::update_flock);

    let delete_route = warp::path!("api" / "v1" / "flocks" / u32)
        .and(warp::delete())
        .and(farm_filter.clone())
        .and_then(flocks::delete_flock);

    let dashboard_route = warp::path!("api" / "v1" / "flocks" / u32 / "dashboard")
        .and(warp::get())
        .and(farm_filter)
        .and_then(flocks::get_flock_dashboard);

    dashboard_route
        .or(list_route)
        .or(create_route)
        .or(get_route)
        .or(update_route)
        .or(delete_route)
}

fn record_routes(
    farm: Arc<FarmClient>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let farm_filter = warp::any().map(move || farm.clone());

    let list_sales = warp::path!("api" / "v1" / "sales")
        .and(warp::get())
        .and(warp::query::<records::FlockQuery>())
        .and(farm_filter.clone())
        .and_then(records::list_sales);

    let create_sale = warp::path!("api" / "v1" / "sales")
        .and(warp::post())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(records::create_sale);

    let update_sale = warp::path!("api" / "v1" / "sales" / u32)
        .and(warp::put())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(records::update_sale);

    let delete_sale = warp::path!("api" / "v1" / "sales" / u32)
        .and(warp::delete())
        .and(farm_filter.clone())
        .and_then(records::delete_sale);

    let list_expenses = warp::path!("api" / "v1" / "expenses")
        .and(warp::get())
        .and(warp::query::<records::FlockQuery>())
        .and(farm_filter.clone())
        .and_then(records::list_expenses);

    let create_expense = warp::path!("api" / "v1" / "expenses")
        .and(warp::post())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(records::create_expense);

    let update_expense = warp::path!("api" / "v1" / "expenses" / u32)
        .and(warp::put())
        .and(json_body::<Value>())
        .and(farm_filter.clone())
        .and_then(records::update_expense);

    let delete_expense = warp::path!("api" / "v1" / "expenses" / u32)
        .and(warp::delete())
        .and(farm_filter.clone())
        .and_then(records::delete_expense);

    let list_customers = warp::path!("api" / "v1" / "customers")
        .and(warp::get())
        .and(farm_filter)
        .and_then(records::list_customers);

    list_sales
        .or(create_sale)
        .or(update_sale)
        .or(delete_sale)
        .or(list_expenses)
        .or(create_expense)
        .or(update_expense)
        .or(delete_expense)
        .or(list_customers)
}

pub fn routes(
    farm: Arc<FarmClient>,
    insights_client: Arc<InsightsClient>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let farm_filter = warp::any().map({
        let farm = farm.clone();
        move || farm.clone()
    });
    let insights_filter = warp::any().map(move || insights_client.clone());

    let financials_route = warp::path!("api" / "v1" / "financials")
        .and(warp::get())
        .and(warp::query::<financials::RangeQuery>())
        .and(farm_filter)
        .and_then(financials::get_financials);

    let insights_route = warp::path!("api" / "v1" / "insights")
        .and(warp::post())
        .and(json_body::<insights::InsightRequest>())
        .and(insights_filter)
        .and_then(insights::post_insights);

    let egg_logs = log_routes(LogKind::Egg, farm.clone());
    let mortality_logs = log_routes(LogKind::Mortality, farm.clone());
    let feed_logs = log_routes(LogKind::Feed, farm.clone());

    info!("All routes configured successfully.");

    financials_route
        .or(insights_route)
        .or(flock_routes(farm.clone()))
        .or(egg_logs)
        .or(mortality_logs)
        .or(feed_logs)
        .or(record_routes(farm))
        .recover(handle_rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::farm::FarmConfig;
    use crate::services::insights::InsightsConfig;

    fn test_routes() -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        // Port 1 refuses connections, so upstream failures are immediate.
        let farm = Arc::new(FarmClient::new(FarmConfig {
            base_url: "http://127.0.0.1:1/api".to_string(),
        }));
        let insights_client = Arc::new(InsightsClient::new(InsightsConfig {
            api_url: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "test".to_string(),
        }));
        routes(farm, insights_client)
    }

    #[tokio::test]
    async fn unknown_path_is_a_json_404() {
        let api = test_routes();
        let response = warp::test::request()
            .path("/definitely/not/here")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn insights_without_flock_data_is_a_400() {
        let api = test_routes();
        let response = warp::test::request()
            .method("POST")
            .path("/api/v1/insights")
            .json(&serde_json::json!({}))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Missing flock data");
    }

    #[tokio::test]
    async fn insights_with_malformed_body_is_a_400() {
        let api = test_routes();
        let response = warp::test::request()
            .method("POST")
            .path("/api/v1/insights")
            .header("content-type", "application/json")
            .body("not json")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_as_502() {
        let api = test_routes();
        let response = warp::test::request()
            .path("/api/v1/flocks")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Failed to load flocks");
    }
}

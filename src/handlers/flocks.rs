// src/handlers/flocks.rs
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Rejection;

use super::error::ApiError;
use crate::services::farm::FarmClient;
use crate::services::overview::flock_overview;

fn upstream(message: &str) -> Rejection {
    warp::reject::custom(ApiError::upstream(message))
}

pub async fn list_flocks(farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list flocks");
    let flocks = farm.list_flocks().await.map_err(|e| {
        error!("Failed to fetch flocks: {:#}", e);
        upstream("Failed to load flocks")
    })?;
    Ok(warp::reply::json(&flocks))
}

pub async fn get_flock(id: u32, farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to get flock {}", id);
    let flock = farm.get_flock(id).await.map_err(|e| {
        error!("Failed to fetch flock {}: {:#}", id, e);
        upstream("Failed to load flock")
    })?;
    Ok(warp::reply::json(&flock))
}

pub async fn create_flock(
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to create a flock");
    let created = farm.create_flock(&body).await.map_err(|e| {
        error!("Failed to create flock: {:#}", e);
        upstream("Failed to save flock")
    })?;
    Ok(warp::reply::with_status(
        warp::reply::json(&created),
        StatusCode::CREATED,
    ))
}

pub async fn update_flock(
    id: u32,
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to update flock {}", id);
    let updated = farm.update_flock(id, &body).await.map_err(|e| {
        error!("Failed to update flock {}: {:#}", id, e);
        upstream("Failed to save flock")
    })?;
    Ok(warp::reply::json(&updated))
}

pub async fn delete_flock(id: u32, farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to delete flock {}", id);
    farm.delete_flock(id).await.map_err(|e| {
        error!("Failed to delete flock {}: {:#}", id, e);
        upstream("Failed to delete flock")
    })?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

/// Per-flock dashboard: card totals plus the recent egg trend.
pub async fn get_flock_dashboard(
    id: u32,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to get dashboard for flock {}", id);
    let flock = farm.get_flock(id).await.map_err(|e| {
        error!("Failed to fetch flock {} for dashboard: {:#}", id, e);
        upstream("Failed to load flock data")
    })?;
    Ok(warp::reply::json(&flock_overview(&flock)))
}

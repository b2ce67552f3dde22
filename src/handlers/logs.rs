// src/handlers/logs.rs
//
// Proxy handlers for the per-flock log collections. All three kinds share
// the same shape, so the handlers take the kind as a parameter and the
// routes pin it.
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Rejection;

use super::error::ApiError;
use crate::services::farm::{FarmClient, LogKind};

fn load_failure(kind: LogKind) -> Rejection {
    warp::reject::custom(ApiError::upstream(format!(
        "Failed to load {}",
        kind.segment().replace('_', " ")
    )))
}

fn save_failure(kind: LogKind) -> Rejection {
    warp::reject::custom(ApiError::upstream(format!(
        "Failed to save {}",
        kind.segment().replace('_', " ")
    )))
}

pub async fn list_logs(
    flock_id: u32,
    kind: LogKind,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list {} for flock {}", kind.segment(), flock_id);
    let logs = farm.list_logs(flock_id, kind).await.map_err(|e| {
        error!("Failed to fetch {} for flock {}: {:#}", kind.segment(), flock_id, e);
        load_failure(kind)
    })?;
    Ok(warp::reply::json(&logs))
}

pub async fn create_log(
    flock_id: u32,
    kind: LogKind,
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to create a {} entry for flock {}", kind.segment(), flock_id);
    let created = farm.create_log(flock_id, kind, &body).await.map_err(|e| {
        error!("Failed to create {} entry for flock {}: {:#}", kind.segment(), flock_id, e);
        save_failure(kind)
    })?;
    Ok(warp::reply::with_status(
        warp::reply::json(&created),
        StatusCode::CREATED,
    ))
}

pub async fn update_log(
    flock_id: u32,
    kind: LogKind,
    log_id: u32,
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to update {} entry {} for flock {}", kind.segment(), log_id, flock_id);
    let updated = farm
        .update_log(flock_id, kind, log_id, &body)
        .await
        .map_err(|e| {
            error!("Failed to update {} entry {}: {:#}", kind.segment(), log_id, e);
            save_failure(kind)
        })?;
    Ok(warp::reply::json(&updated))
}

pub async fn delete_log(
    flock_id: u32,
    kind: LogKind,
    log_id: u32,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to delete {} entry {} for flock {}", kind.segment(), log_id, flock_id);
    farm.delete_log(flock_id, kind, log_id).await.map_err(|e| {
        error!("Failed to delete {} entry {}: {:#}", kind.segment(), log_id, e);
        save_failure(kind)
    })?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

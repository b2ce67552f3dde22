// src/handlers/records.rs
//
// Sales and expenses as single resources with an optional flock filter,
// plus the customer list the sale form needs.
use log::{error, info};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Rejection;

use super::error::ApiError;
use crate::services::farm::FarmClient;

#[derive(Debug, Default, Deserialize)]
pub struct FlockQuery {
    pub flock: Option<u32>,
}

fn upstream(message: &str) -> Rejection {
    warp::reject::custom(ApiError::upstream(message))
}

pub async fn list_sales(
    query: FlockQuery,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list sales (flock filter: {:?})", query.flock);
    let sales = farm.list_sales(query.flock).await.map_err(|e| {
        error!("Failed to fetch sales: {:#}", e);
        upstream("Failed to load sales")
    })?;
    Ok(warp::reply::json(&sales))
}

pub async fn create_sale(body: Value, farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to create a sale");
    let created = farm.create_sale(&body).await.map_err(|e| {
        error!("Failed to create sale: {:#}", e);
        upstream("Failed to save sale")
    })?;
    Ok(warp::reply::with_status(
        warp::reply::json(&created),
        StatusCode::CREATED,
    ))
}

pub async fn update_sale(
    id: u32,
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to update sale {}", id);
    let updated = farm.update_sale(id, &body).await.map_err(|e| {
        error!("Failed to update sale {}: {:#}", id, e);
        upstream("Failed to save sale")
    })?;
    Ok(warp::reply::json(&updated))
}

pub async fn delete_sale(id: u32, farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to delete sale {}", id);
    farm.delete_sale(id).await.map_err(|e| {
        error!("Failed to delete sale {}: {:#}", id, e);
        upstream("Failed to delete sale")
    })?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn list_expenses(
    query: FlockQuery,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list expenses (flock filter: {:?})", query.flock);
    let expenses = farm.list_expenses(query.flock).await.map_err(|e| {
        error!("Failed to fetch expenses: {:#}", e);
        upstream("Failed to load expenses")
    })?;
    Ok(warp::reply::json(&expenses))
}

pub async fn create_expense(
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to create an expense");
    let created = farm.create_expense(&body).await.map_err(|e| {
        error!("Failed to create expense: {:#}", e);
        upstream("Failed to save expense")
    })?;
    Ok(warp::reply::with_status(
        warp::reply::json(&created),
        StatusCode::CREATED,
    ))
}

pub async fn update_expense(
    id: u32,
    body: Value,
    farm: Arc<FarmClient>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to update expense {}", id);
    let updated = farm.update_expense(id, &body).await.map_err(|e| {
        error!("Failed to update expense {}: {:#}", id, e);
        upstream("Failed to save expense")
    })?;
    Ok(warp::reply::json(&updated))
}

pub async fn delete_expense(id: u32, farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to delete expense {}", id);
    farm.delete_expense(id).await.map_err(|e| {
        error!("Failed to delete expense {}: {:#}", id, e);
        upstream("Failed to delete expense")
    })?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn list_customers(farm: Arc<FarmClient>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list customers");
    let customers = farm.list_customers().await.map_err(|e| {
        error!("Failed to fetch customers: {:#}", e);
        upstream("Failed to load customers")
    })?;
    Ok(warp::reply::json(&customers))
}

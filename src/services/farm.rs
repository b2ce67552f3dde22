// src/services/farm.rs
//
// Typed client for the farm-records REST backend. The backend owns all
// persistence; this service only fetches snapshots and forwards mutations.
use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::env;

use crate::models::{Customer, Flock};

#[derive(Debug, Clone)]
pub struct FarmConfig {
    pub base_url: String,
}

impl FarmConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("FARM_API_URL").unwrap_or_else(|_| {
            log::warn!("$FARM_API_URL not set, defaulting to http://localhost:8000/api");
            "http://localhost:8000/api".to_string()
        });
        FarmConfig { base_url }
    }
}

/// The per-flock log collections all share the same list/create/update/delete
/// shape; only the path segment differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Egg,
    Mortality,
    Feed,
}

impl LogKind {
    pub fn segment(self) -> &'static str {
        match self {
            LogKind::Egg => "egg_logs",
            LogKind::Mortality => "mortality_logs",
            LogKind::Feed => "feed_logs",
        }
    }
}

pub struct FarmClient {
    base_url: String,
    client: Client,
}

impl FarmClient {
    pub fn new(config: FarmConfig) -> Self {
        FarmClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
            .with_context(|| format!("invalid JSON from GET {}", url))?;
        Ok(value)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let value = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
            .with_context(|| format!("invalid JSON from POST {}", url))?;
        Ok(value)
    }

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("PUT {}", url);
        let value = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
            .with_context(|| format!("invalid JSON from PUT {}", url))?;
        Ok(value)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.client
            .delete(&url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Full flock list with nested logs, the pipeline's input snapshot.
    pub async fn list_flocks(&self) -> Result<Vec<Flock>> {
        let value = self.get_json("flocks/").await?;
        let flocks = serde_json::from_value(value).context("unexpected flock list shape")?;
        Ok(flocks)
    }

    pub async fn get_flock(&self, id: u32) -> Result<Flock> {
        let value = self.get_json(&format!("flocks/{}/", id)).await?;
        let flock = serde_json::from_value(value).context("unexpected flock shape")?;
        Ok(flock)
    }

    pub async fn create_flock(&self, body: &Value) -> Result<Value> {
        self.post_json("flocks/", body).await
    }

    pub async fn update_flock(&self, id: u32, body: &Value) -> Result<Value> {
        self.put_json(&format!("flocks/{}/", id), body).await
    }

    pub async fn delete_flock(&self, id: u32) -> Result<()> {
        self.delete(&format!("flocks/{}/", id)).await
    }

    pub async fn list_logs(&self, flock_id: u32, kind: LogKind) -> Result<Value> {
        self.get_json(&format!("flocks/{}/{}/", flock_id, kind.segment()))
            .await
    }

    pub async fn create_log(&self, flock_id: u32, kind: LogKind, body: &Value) -> Result<Value> {
        self.post_json(&format!("flocks/{}/{}/", flock_id, kind.segment()), body)
            .await
    }

    pub async fn update_log(
        &self,
        flock_id: u32,
        kind: LogKind,
        log_id: u32,
        body: &Value,
    ) -> Result<Value> {
        self.put_json(
            &format!("flocks/{}/{}/{}/", flock_id, kind.segment(), log_id),
            body,
        )
        .await
    }

    pub async fn delete_log(&self, flock_id: u32, kind: LogKind, log_id: u32) -> Result<()> {
        self.delete(&format!("flocks/{}/{}/{}/", flock_id, kind.segment(), log_id))
            .await
    }

    /// Sales are one resource: pass a flock id to list a single flock's
    /// sales, or none for all of them.
    pub async fn list_sales(&self, flock: Option<u32>) -> Result<Value> {
        match flock {
            Some(id) => self.get_json(&format!("flocks/{}/sales/", id)).await,
            None => self.get_json("sales/").await,
        }
    }

    pub async fn create_sale(&self, body: &Value) -> Result<Value> {
        self.post_json("sales/", body).await
    }

    pub async fn update_sale(&self, id: u32, body: &Value) -> Result<Value> {
        self.put_json(&format!("sales/{}/", id), body).await
    }

    pub async fn delete_sale(&self, id: u32) -> Result<()> {
        self.delete(&format!("sales/{}/", id)).await
    }

    pub async fn list_expenses(&self, flock: Option<u32>) -> Result<Value> {
        match flock {
            Some(id) => self.get_json(&format!("flocks/{}/expenses/", id)).await,
            None => self.get_json("expenses/").await,
        }
    }

    pub async fn create_expense(&self, body: &Value) -> Result<Value> {
        self.post_json("expenses/", body).await
    }

    pub async fn update_expense(&self, id: u32, body: &Value) -> Result<Value> {
        self.put_json(&format!("expenses/{}/", id), body).await
    }

    pub async fn delete_expense(&self, id: u32) -> Result<()> {
        self.delete(&format!("expenses/{}/", id)).await
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let value = self.get_json("customers/").await?;
        let customers =
            serde_json::from_value(value).context("unexpected customer list shape")?;
        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = FarmClient::new(FarmConfig {
            base_url: "http://localhost:8000/api/".to_string(),
        });
        assert_eq!(client.url("flocks/"), "http://localhost:8000/api/flocks/");
    }

    #[test]
    fn log_kinds_map_to_backend_segments() {
        assert_eq!(LogKind::Egg.segment(), "egg_logs");
        assert_eq!(LogKind::Mortality.segment(), "mortality_logs");
        assert_eq!(LogKind::Feed.segment(), "feed_logs");
    }
}

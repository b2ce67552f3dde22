// src/services/insights.rs
//
// Narrative flock summaries from a hosted completion model. The full flock
// payload is digested down to header fields plus log counts before it goes
// into the prompt; any failure degrades to a fixed fallback sentence.
use anyhow::{anyhow, Result};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;

use crate::models::Flock;

pub const FALLBACK_MESSAGE: &str =
    "There was an issue analyzing the flock data. Please try again later.";

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low temperature keeps the advisory tone steady between calls.
const TEMPERATURE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct InsightsConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl InsightsConfig {
    pub fn from_env() -> Self {
        let api_url =
            env::var("INSIGHTS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_key = env::var("INSIGHTS_API_KEY").unwrap_or_else(|_| {
            log::warn!("$INSIGHTS_API_KEY not set, insight requests will fail over to the fallback message");
            String::new()
        });
        let model = env::var("INSIGHTS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        InsightsConfig {
            api_url,
            api_key,
            model,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Replace each nested log list with a one-line count so the prompt stays
/// inside the model's context budget.
pub fn digest_flock(flock: &Flock) -> serde_json::Value {
    json!({
        "id": flock.id,
        "name": flock.name,
        "breed": flock.breed,
        "initial_count": flock.initial_count,
        "acquisition_date": flock.acquisition_date,
        "egg_logs": format!("Total {} days of egg logs.", flock.egg_logs.len()),
        "mortality_logs": format!("Total {} mortality events.", flock.mortality_logs.len()),
        "feed_logs": format!("Total {} feed logs.", flock.feed_logs.len()),
        "sales": format!("Total {} sale records.", flock.sales.len()),
        "expenses": format!("Total {} expense records.", flock.expenses.len()),
    })
}

pub fn build_prompt(flock: &Flock) -> String {
    let digest = serde_json::to_string_pretty(&digest_flock(flock))
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an expert poultry farm advisor.\n\
         Analyze the following summary of a poultry flock's data.\n\
         Based on this data, provide:\n\
         1. A concise summary (2-3 sentences) of the flock's overall performance, \
         mentioning key aspects like profit, egg production, and mortality.\n\
         2. One actionable, data-driven piece of advice to help the owner improve \
         their operation.\n\n\
         Keep your entire response under 75 words. Be encouraging and clear.\n\n\
         Data:\n```json\n{}\n```",
        digest
    )
}

pub struct InsightsClient {
    config: InsightsConfig,
    client: Client,
}

impl InsightsClient {
    pub fn new(config: InsightsConfig) -> Self {
        InsightsClient {
            config,
            client: Client::new(),
        }
    }

    /// Never fails: an unreachable or misbehaving model degrades to the
    /// fixed fallback sentence, with the cause logged.
    pub async fn generate(&self, flock: &Flock) -> String {
        let prompt = build_prompt(flock);
        match self.request_completion(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error generating AI insight: {:#}", e);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        debug!("POST {} (model {})", self.config.api_url, self.config.model);
        let response: CompletionResponse = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("completion response contained no choices"))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EggLog, Sale};
    use chrono::NaiveDate;

    fn test_flock() -> Flock {
        Flock {
            id: Some(1),
            name: "Sunrise Layers".to_string(),
            breed: "ISA Brown".to_string(),
            initial_count: 50,
            acquisition_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            egg_logs: vec![
                EggLog {
                    id: None,
                    date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    count: 40,
                },
                EggLog {
                    id: None,
                    date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                    count: 42,
                },
            ],
            mortality_logs: vec![],
            feed_logs: vec![],
            sales: vec![Sale {
                id: None,
                flock: None,
                customer: None,
                date: NaiveDate::from_ymd_opt(2024, 2, 3),
                item: "Eggs".to_string(),
                quantity: 12,
                price: 42.0,
            }],
            expenses: vec![],
        }
    }

    #[test]
    fn digest_replaces_logs_with_counts() {
        let digest = digest_flock(&test_flock());
        assert_eq!(digest["egg_logs"], "Total 2 days of egg logs.");
        assert_eq!(digest["mortality_logs"], "Total 0 mortality events.");
        assert_eq!(digest["sales"], "Total 1 sale records.");
        assert_eq!(digest["name"], "Sunrise Layers");
    }

    #[test]
    fn prompt_embeds_the_digest_and_instructions() {
        let prompt = build_prompt(&test_flock());
        assert!(prompt.contains("expert poultry farm advisor"));
        assert!(prompt.contains("under 75 words"));
        assert!(prompt.contains("Total 2 days of egg logs."));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn completion_response_parses_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Your flock is thriving."}}]}"#;
        let response: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.choices[0].message.content,
            "Your flock is thriving."
        );
    }
}

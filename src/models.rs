// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dates on sale/expense records arrive from the farm backend as ISO
/// `yyyy-mm-dd` strings, but upstream data can be missing or malformed.
/// A bad date deserializes to `None` instead of failing the whole fetch;
/// the normalizer drops dateless records later.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flock {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    pub breed: String,
    pub initial_count: u32,
    pub acquisition_date: NaiveDate,
    #[serde(default)]
    pub egg_logs: Vec<EggLog>,
    #[serde(default)]
    pub mortality_logs: Vec<MortalityLog>,
    #[serde(default)]
    pub feed_logs: Vec<FeedLog>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EggLog {
    #[serde(default)]
    pub id: Option<u32>,
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityLog {
    #[serde(default)]
    pub id: Option<u32>,
    pub date: NaiveDate,
    pub count: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedLog {
    #[serde(default)]
    pub id: Option<u32>,
    pub date: NaiveDate,
    pub quantity_kg: f64,
    pub cost: f64,
}

/// A sale record. `flock` and `customer` are present on the flock-agnostic
/// resource and absent when the record is nested under a flock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub flock: Option<u32>,
    #[serde(default)]
    pub customer: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub date: Option<NaiveDate>,
    pub item: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub flock: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub date: Option<NaiveDate>,
    pub item: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
}

// src/services/overview.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Flock;

/// Dashboard card metrics for a single flock, plus the recent egg-production
/// series for the trend chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlockOverview {
    pub name: String,
    pub breed: String,
    pub initial_count: u32,
    pub total_eggs: u64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub total_mortality: u32,
    pub mortality_rate: f64,
    pub egg_trend: Vec<EggPoint>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EggPoint {
    pub date: NaiveDate,
    pub count: u32,
}

/// How many days of egg logs the trend chart shows.
const EGG_TREND_DAYS: usize = 14;

pub fn flock_overview(flock: &Flock) -> FlockOverview {
    let total_eggs: u64 = flock.egg_logs.iter().map(|log| u64::from(log.count)).sum();
    let total_revenue: f64 = flock.sales.iter().map(|sale| sale.price).sum();
    let total_expenses: f64 = flock.expenses.iter().map(|expense| expense.cost).sum();
    let total_mortality: u32 = flock.mortality_logs.iter().map(|log| log.count).sum();

    let mortality_rate = if flock.initial_count == 0 {
        0.0
    } else {
        f64::from(total_mortality) / f64::from(flock.initial_count) * 100.0
    };

    let trend_start = flock.egg_logs.len().saturating_sub(EGG_TREND_DAYS);
    let egg_trend = flock.egg_logs[trend_start..]
        .iter()
        .map(|log| EggPoint {
            date: log.date,
            count: log.count,
        })
        .collect();

    FlockOverview {
        name: flock.name.clone(),
        breed: flock.breed.clone(),
        initial_count: flock.initial_count,
        total_eggs,
        total_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
        total_mortality,
        mortality_rate,
        egg_trend,
    }
}

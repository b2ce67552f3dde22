// src/bin/test_forecast.rs
use chrono::Utc;
use dotenv::dotenv;
use feather_metrics::services::farm::{FarmClient, FarmConfig};
use feather_metrics::services::finance::{
    aggregate_by_date, collect_events, project_forecast, summarize, upcoming_month_labels,
    RandomJitter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let farm = FarmClient::new(FarmConfig::from_env());
    let flocks = farm.list_flocks().await?;

    let (sales, expenses) = collect_events(&flocks);
    let series = aggregate_by_date(&sales, &expenses);
    let summary = summarize(&series);

    println!("{} aggregated dates", series.len());
    println!(
        "Total revenue: {:.2}  Total expenses: {:.2}  Profit margin: {:.1}%",
        summary.total_revenue,
        summary.total_expenses,
        summary.profit_margin * 100.0
    );

    let labels = upcoming_month_labels(Utc::now().date_naive(), 3);
    for period in project_forecast(&series, &labels, &mut RandomJitter) {
        println!(
            "  {}: revenue {} / expenses {} / profit {}",
            period.month, period.revenue, period.expenses, period.profit
        );
    }
    Ok(())
}

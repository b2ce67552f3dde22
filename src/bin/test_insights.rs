// src/bin/test_insights.rs
use dotenv::dotenv;
use feather_metrics::services::farm::{FarmClient, FarmConfig};
use feather_metrics::services::insights::{InsightsClient, InsightsConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let farm = FarmClient::new(FarmConfig::from_env());
    let flock = farm.get_flock(1).await?;

    let insights = InsightsClient::new(InsightsConfig::from_env());
    println!("Insight for '{}':", flock.name);
    println!("{}", insights.generate(&flock).await);
    Ok(())
}

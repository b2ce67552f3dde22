// src/bin/test_farm.rs
use dotenv::dotenv;
use feather_metrics::services::farm::{FarmClient, FarmConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let farm = FarmClient::new(FarmConfig::from_env());
    let flocks = farm.list_flocks().await?;

    println!("Fetched {} flocks", flocks.len());
    for flock in &flocks {
        println!(
            "  {:?} {} ({}) - {} sales, {} expenses, {} egg logs",
            flock.id,
            flock.name,
            flock.breed,
            flock.sales.len(),
            flock.expenses.len(),
            flock.egg_logs.len()
        );
    }
    Ok(())
}

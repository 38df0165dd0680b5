use energy_advisor::{api::start_server, build_generator, config::AdvisorConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AdvisorConfig::from_env()?;

    info!("Energy Advisor - API Server");
    info!("Port: {}", config.port);
    info!("Dataset: {}", config.dataset_path.display());

    // Refuse to serve without usable statistics
    let generator = Arc::new(build_generator(&config)?);
    let stats = generator.classifier().statistics();

    info!(
        mean = stats.mean,
        stddev = stats.stddev,
        default_price_per_kwh = config.default_price_per_kwh,
        "Advisor initialized"
    );

    start_server(generator, config.port).await?;

    Ok(())
}

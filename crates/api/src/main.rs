//! Churn API Server - Main Entry Point

use api::{init_logging, run_server, ApiConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Churn Prediction API v{} ===", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::load()?;
    run_server(config).await?;

    Ok(())
}

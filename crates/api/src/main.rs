//! DSP Block Server - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    init_logging(&config)?;

    info!("=== DSP Block Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    run_server(config).await?;

    Ok(())
}

//! Presence API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p presence-api
//! ```
//!
//! Configuration is loaded from `presence.toml` (optional) and
//! `PRESENCE_`-prefixed environment variables.

use presence_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration before tracing so the log format can follow the environment
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the server
    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        "Starting Presence API Server..."
    );

    presence_api::run(config).await?;

    Ok(())
}

//! Sanction worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p mute-worker
//! ```
//!
//! Configuration is loaded from environment variables.

use mute_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so the log format follows APP_ENV
    let config = match AppConfig::from_env() {
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

    // Run the worker
    if let Err(e) = run(config).await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        reconcile_interval_secs = config.reconciler.interval_secs,
        inline_timers = config.engine.inline_timers,
        "Starting sanction worker..."
    );

    mute_worker::run(config).await?;

    Ok(())
}

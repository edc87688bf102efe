//! Parley Server — real-time presence and message fanout
//!
//! Main entry point that loads configuration, sets up logging and starts
//! the HTTP/WebSocket server.

use tracing_subscriber::{EnvFilter, fmt};

use parley_core::config::AppConfig;
use parley_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = parley_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `PARLEY__*` environment variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PARLEY_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

//! Huddle server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `huddle-config.yaml` (or `$HUDDLE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the team roster
//! 4. Open the counter store
//! 5. Serve the HTTP API until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use huddle_core::HuddleConfig;
use huddle_server::{AppState, ServerConfig, start_server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store cannot be
/// opened, or the server fails to bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var("HUDDLE_CONFIG")
        .map_or_else(|_| PathBuf::from("huddle-config.yaml"), PathBuf::from);
    let config_found = config_path.exists();
    let config = HuddleConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("huddle-server starting");
    if !config_found {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Validate the roster. An empty or duplicated team list is fatal.
    let roster = config.roster().inspect_err(|e| {
        error!(error = %e, "Invalid team roster");
    })?;
    info!(
        teams = ?roster.teams(),
        host = config.server.host,
        port = config.server.port,
        store = %config.store.path.display(),
        "Configuration loaded"
    );

    // 4. Open the counter store.
    let state = Arc::new(AppState::open(&config, roster).await?);

    // 5. Serve.
    start_server(&ServerConfig::from(&config.server), state).await?;

    info!("huddle-server stopped");
    Ok(())
}

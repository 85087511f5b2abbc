//! POOLHALL: Betting-Slip Service for Sports-Tournament Pools
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores slip drafts from disk, and serves the slip HTTP API with
//! graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use poolhall::backend::RestBackend;
use poolhall::config;
use poolhall::server::{self, HallState};
use poolhall::storage;

const BANNER: &str = r#"
 ____   ___   ___  _     _   _    _    _     _
|  _ \ / _ \ / _ \| |   | | | |  / \  | |   | |
| |_) | | | | | | | |   | |_| | / _ \ | |   | |
|  __/| |_| | |_| | |___|  _  |/ ___ \| |___| |___
|_|    \___/ \___/|_____|_| |_/_/   \_\_____|_____|

  Betting-Slip Service for Sports-Tournament Pools
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        service_name = %cfg.service.name,
        backend_url = %cfg.backend.base_url,
        port = cfg.server.port,
        "POOLHALL starting up"
    );

    // -- Initialise components -------------------------------------------

    let token = cfg.backend_token()?;
    let backend = RestBackend::new(&cfg.backend, token)?;

    let state = Arc::new(HallState::new(
        Box::new(backend),
        Some(cfg.service.draft_file.clone()),
    ));

    // -- Restore drafts ---------------------------------------------------

    match storage::load_drafts(Some(&cfg.service.draft_file))? {
        Some(drafts) => {
            info!(tournaments = drafts.len(), "Resumed slip drafts from disk");
            state.restore_drafts(drafts).await;
        }
        None => {
            info!("No slip drafts to restore");
        }
    }

    // -- Serve -------------------------------------------------------------

    if !cfg.server.enabled {
        info!("Server disabled in config, nothing to do.");
        return Ok(());
    }

    server::spawn_server(state.clone(), cfg.server.port)?;

    info!("Serving. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    // Persist any in-progress slips for the next run.
    let slips = state.slips.read().await;
    let drafts: storage::SlipDrafts = slips
        .iter()
        .map(|(id, slip)| (*id, slip.selections().to_vec()))
        .collect();
    if let Err(e) = storage::save_drafts(&drafts, Some(&cfg.service.draft_file)) {
        error!(error = %e, "Failed to save drafts on shutdown");
    }

    info!(drafts = drafts.len(), "POOLHALL shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("poolhall=info"));

    let json_logging = std::env::var("POOLHALL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

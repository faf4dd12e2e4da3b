//! # Homestead
//!
//! Headless entry point: loads `homestead.toml` (or the path given as the
//! first argument), the item catalog and an optional intent script, then
//! replays the script through a fresh game session.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use homestead_engine::{run_headless, EngineConfig, EventLogger};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

fn init_tracing(config: &EngineConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("invalid log filter {:?}", config.log_filter))?,
    };
    let fmt_layer = if config.log_json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
    Ok(())
}

/// Main entry point.
fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(homestead_engine::config::CONFIG_FILE), PathBuf::from);
    let config = EngineConfig::load_from(&config_path);
    init_tracing(&config)?;

    info!("Homestead starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Config: {}", config_path.display());

    let mut logger = EventLogger::new();
    let run = run_headless(&config, &mut logger).context("headless run failed")?;
    if let Some(report) = run.replay {
        info!(
            "Script finished: {} frames, {} failed, {} events",
            report.frames, report.failed_frames, report.events
        );
    }
    let session = run.session;

    info!(
        "Final player inventory: {}",
        session.player_inventory()
    );
    info!("Placed objects: {}", session.placed_objects().len());
    info!("Homestead shutdown complete");
    Ok(())
}

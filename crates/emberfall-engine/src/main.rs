//! # Emberfall Engine
//!
//! Headless driver for the Emberfall enemy simulation.
//!
//! This crate ties the simulation to:
//! - Logging setup
//! - TOML configuration
//! - Fixed-timestep pacing
//! - A scripted player and stand-in battle resolver

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod harness;
mod timing;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};
use crate::harness::Harness;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("emberfall=info".parse()?))
        .init();

    info!("Emberfall starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let mut config = EngineConfig::load_from(&config_path);
    config.validate();

    let mut harness = Harness::new(config)?;
    let summary = harness.run()?;

    info!(
        "Emberfall shutdown complete after {} ticks, {} kills",
        summary.ticks, summary.kills
    );
    Ok(())
}

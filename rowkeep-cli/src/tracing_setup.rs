//! Tracing setup for the rowkeep CLI
//!
//! Usage:
//!   rowkeep serve --debug                 # Debug logging to console
//!   RUST_LOG=rowkeep_server=debug rowkeep # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize console tracing. `RUST_LOG` wins over `debug` when set.
pub fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

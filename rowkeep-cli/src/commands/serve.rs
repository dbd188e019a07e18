//! HTTP server command
//!
//! Resolves configuration (flags > environment > file > defaults) and runs
//! the record service until Ctrl+C/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rowkeep_core::{ConnectionPolicy, RowkeepConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Config file (default: ./rowkeep.toml if present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Address to bind to (default: 127.0.0.1:8001)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL, or memory:// for the in-process store (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Open a fresh store connection per request instead of pooling
    #[arg(long)]
    pub per_request: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl ServeArgs {
    /// Load the config and layer environment and flags on top
    pub fn resolve(&self) -> Result<RowkeepConfig> {
        let mut config = RowkeepConfig::discover(self.config.as_deref()).context("Failed to load config")?;
        config.apply_env().context("Invalid environment override")?;

        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if self.per_request {
            config.database.connection = ConnectionPolicy::PerRequest;
        }
        Ok(config)
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.resolve()?;

    tracing::info!(
        bind = %config.server.bind,
        connection = ?config.database.connection,
        "Starting rowkeep server"
    );

    rowkeep_server::serve(config).await.context("Server error")?;

    Ok(())
}

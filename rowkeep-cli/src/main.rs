//! rowkeep: schema-driven record service

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "rowkeep",
    author,
    version,
    about = "Schema-driven JSON record service over Postgres",
    long_about = "Serve list/get/insert/update/delete endpoints for each configured \
                  collection. Collections come from rowkeep.toml presets or explicit field lists."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP record service
    Serve(commands::ServeArgs),
    /// Show resolved collections, or their CREATE TABLE statements
    Schema(commands::SchemaArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            tracing_setup::init_tracing(args.debug).ok();
            commands::run_serve(args).await?
        }
        Commands::Schema(args) => {
            tracing_setup::init_tracing(false).ok();
            commands::run_schema(args)?
        }
    }

    Ok(())
}

//! Print the resolved collections

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rowkeep_core::{RecordSchema, RowkeepConfig};
use rowkeep_server::store::sql;

/// Arguments for the schema command
#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Config file (default: ./rowkeep.toml if present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print CREATE TABLE statements instead of the field listing
    #[arg(long)]
    pub ddl: bool,
}

pub fn run_schema(args: SchemaArgs) -> Result<()> {
    let config = RowkeepConfig::discover(args.config.as_deref()).context("Failed to load config")?;
    let schemas = config.schemas().context("Invalid collection config")?;
    print!("{}", render(&schemas, args.ddl));
    Ok(())
}

fn render(schemas: &[RecordSchema], ddl: bool) -> String {
    let mut out = String::new();
    for schema in schemas {
        if ddl {
            let _ = writeln!(out, "{};\n", sql::create_table(schema));
            continue;
        }

        let _ = writeln!(out, "/{} (table {})", schema.collection(), schema.table());
        for field in schema.fields() {
            let marker = if field.identity { "  [identity]" } else { "" };
            let _ = writeln!(out, "  {:<16} {}{}", field.name.as_str(), field.kind, marker);
        }
        out.push('\n');
    }
    out
}

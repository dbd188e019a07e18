//! Service configuration
//!
//! Loaded from TOML (`--config`, else `./rowkeep.toml`, else defaults), then
//! overridden by environment:
//! - `DATABASE_URL`: store connection string
//! - `ROWKEEP_BIND`: listen address

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CoreError, Result};
use crate::ident::Ident;
use crate::schema::{FieldDef, Preset, RecordSchema};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "rowkeep.toml";

/// Store URL that selects the in-process store
pub const MEMORY_URL: &str = "memory://";

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 8001);
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/rowkeep";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowkeepConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default)]
    pub connection: ConnectionPolicy,
    /// Pool size; ignored for `per-request`
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Issue `CREATE TABLE IF NOT EXISTS` for each collection at startup
    #[serde(default = "default_true")]
    pub create_tables: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            connection: ConnectionPolicy::default(),
            max_connections: default_max_connections(),
            create_tables: true,
        }
    }
}

impl DatabaseSection {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_URL
    }
}

/// How a store handle is obtained for each operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionPolicy {
    /// Lease from a shared pool, returned on drop
    #[default]
    Pooled,
    /// Open a fresh connection and close it before returning
    PerRequest,
}

/// One served collection: either a preset or an explicit field list
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub name: Ident,
    pub table: Option<Ident>,
    pub preset: Option<Preset>,
    pub fields: Option<Vec<FieldDef>>,
}

impl CollectionConfig {
    pub fn schema(&self) -> Result<RecordSchema> {
        let table = self.table.clone().unwrap_or_else(|| self.name.clone());
        match (&self.preset, &self.fields) {
            (Some(preset), None) => {
                let schema = preset.schema();
                let table = self.table.clone().unwrap_or_else(|| schema.table().clone());
                Ok(schema.renamed(self.name.clone(), table))
            }
            (None, Some(fields)) => RecordSchema::new(self.name.clone(), table, fields.clone()),
            (Some(_), Some(_)) => Err(CoreError::invalid_schema(
                self.name.as_str(),
                "set either `preset` or `fields`, not both",
            )),
            (None, None) => Err(CoreError::invalid_schema(
                self.name.as_str(),
                "one of `preset` or `fields` is required",
            )),
        }
    }
}

impl RowkeepConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `explicit` if given, else `./rowkeep.toml` if present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::debug!(path = %local.display(), "using config from working directory");
            return Self::load(&local);
        }

        Ok(Self::default())
    }

    /// Apply `DATABASE_URL` and `ROWKEEP_BIND` from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup`
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(bind) = lookup("ROWKEEP_BIND") {
            self.server.bind = bind
                .parse()
                .map_err(|_| CoreError::config(format!("ROWKEEP_BIND '{}' is not an address", bind)))?;
        }
        Ok(())
    }

    /// Resolve every collection to a schema.
    ///
    /// With no collections configured, serves `users` with the numbered preset.
    pub fn schemas(&self) -> Result<Vec<RecordSchema>> {
        if self.collections.is_empty() {
            return Ok(vec![Preset::Numbered.schema()]);
        }

        let mut names = HashSet::new();
        self.collections
            .iter()
            .map(|c| {
                if !names.insert(c.name.as_str()) {
                    return Err(CoreError::config(format!(
                        "collection '{}' is configured twice",
                        c.name
                    )));
                }
                c.schema()
            })
            .collect()
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(DEFAULT_BIND)
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_true() -> bool {
    true
}

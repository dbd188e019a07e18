//! rowkeep-core: record schemas, field coercion and configuration
//!
//! Everything here is independent of the store and the HTTP layer: a
//! `RecordSchema` describes one table, and request bodies are decoded into
//! `NewRecord` / `Patch` values against it.

pub mod config;
pub mod error;
pub mod ident;
pub mod record;
pub mod schema;
pub mod value;

pub use config::{CollectionConfig, ConnectionPolicy, RowkeepConfig};
pub use error::{CoreError, Result};
pub use ident::Ident;
pub use record::{NewRecord, Patch, Record};
pub use schema::{FieldDef, FieldKind, Preset, RecordSchema};
pub use value::FieldValue;

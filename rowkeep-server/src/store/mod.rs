//! Record stores
//!
//! `RecordStore` is the seam between HTTP handlers and persistence. Each
//! implementation serves exactly one `RecordSchema`:
//! - `PgRecordStore`: Postgres via sqlx, one lease per operation
//! - `MemoryRecordStore`: in-process rows, for tests and local runs

pub mod memory;
pub mod postgres;
pub mod sql;

use async_trait::async_trait;
use rowkeep_core::{FieldValue, NewRecord, Patch, Record, RecordSchema};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection} '{key}' not found")]
    NotFound { collection: String, key: String },

    #[error("conflict in {collection}: {message}")]
    Conflict { collection: String, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(schema: &RecordSchema, key: &FieldValue) -> Self {
        Self::NotFound {
            collection: schema.collection().to_string(),
            key: key.to_string(),
        }
    }

    /// Map a write failure, turning unique violations into `Conflict`
    pub fn from_write(schema: &RecordSchema, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict {
                    collection: schema.collection().to_string(),
                    message: db.message().to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

/// CRUD over one collection
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn schema(&self) -> &RecordSchema;

    /// All records, store-native order
    async fn list(&self) -> Result<Vec<Record>, StoreError>;

    async fn get(&self, key: &FieldValue) -> Result<Record, StoreError>;

    /// Insert and return the stored identity
    async fn insert(&self, record: NewRecord) -> Result<FieldValue, StoreError>;

    /// Apply `patch` to an existing record; `NotFound` is decided before any write
    async fn update(&self, key: &FieldValue, patch: &Patch) -> Result<(), StoreError>;

    async fn delete(&self, key: &FieldValue) -> Result<(), StoreError>;
}

//! In-process record store
//!
//! Selected with `database.url = "memory://"`. Behaves like the Postgres
//! store at the trait boundary: duplicate identities conflict, integer
//! identities are assigned as `max + 1`, rows keep insertion order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rowkeep_core::{FieldValue, NewRecord, Patch, Record, RecordSchema};

use super::{RecordStore, StoreError};

pub struct MemoryRecordStore {
    schema: RecordSchema,
    rows: Mutex<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new(schema: RecordSchema) -> Self {
        Self {
            schema,
            rows: Mutex::new(Vec::new()),
        }
    }

    fn rows(&self) -> MutexGuard<'_, Vec<Record>> {
        // A panic mid-operation never leaves a half-written row
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn position(rows: &[Record], schema: &RecordSchema, key: &FieldValue) -> Option<usize> {
        rows.iter().position(|r| r.key(schema) == key)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.rows().clone())
    }

    async fn get(&self, key: &FieldValue) -> Result<Record, StoreError> {
        let rows = self.rows();
        Self::position(&rows, &self.schema, key)
            .map(|i| rows[i].clone())
            .ok_or_else(|| StoreError::not_found(&self.schema, key))
    }

    async fn insert(&self, record: NewRecord) -> Result<FieldValue, StoreError> {
        let mut rows = self.rows();
        let key = match record.key.clone() {
            Some(key) => key,
            None => {
                let next = rows
                    .iter()
                    .filter_map(|r| r.key(&self.schema).as_i64())
                    .max()
                    .map_or(1, |max| max.saturating_add(1));
                FieldValue::Integer(next)
            }
        };

        if Self::position(&rows, &self.schema, &key).is_some() {
            return Err(StoreError::Conflict {
                collection: self.schema.collection().to_string(),
                message: format!("duplicate key '{}'", key),
            });
        }

        rows.push(record.into_record(&self.schema, key.clone()));
        Ok(key)
    }

    async fn update(&self, key: &FieldValue, patch: &Patch) -> Result<(), StoreError> {
        let mut rows = self.rows();
        let index = Self::position(&rows, &self.schema, key)
            .ok_or_else(|| StoreError::not_found(&self.schema, key))?;
        rows[index].apply(patch);
        Ok(())
    }

    async fn delete(&self, key: &FieldValue) -> Result<(), StoreError> {
        let mut rows = self.rows();
        let index = Self::position(&rows, &self.schema, key)
            .ok_or_else(|| StoreError::not_found(&self.schema, key))?;
        rows.remove(index);
        Ok(())
    }
}

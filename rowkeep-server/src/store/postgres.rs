//! Postgres-backed record store
//!
//! Each public operation acquires a lease, delegates to a `*_on` function
//! that does the statement work against the leased connection, then releases
//! the lease before returning that function's result.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres, Row};

use rowkeep_core::{FieldKind, FieldValue, NewRecord, Patch, Record, RecordSchema};

use super::{sql, RecordStore, StoreError};
use crate::db::Connector;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Record store for one table
pub struct PgRecordStore {
    schema: RecordSchema,
    connector: Connector,
}

impl PgRecordStore {
    pub fn new(schema: RecordSchema, connector: Connector) -> Self {
        Self { schema, connector }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let mut lease = self.connector.acquire().await?;
        let result = list_on(&mut lease, &self.schema).await;
        lease.release().await;
        result
    }

    async fn get(&self, key: &FieldValue) -> Result<Record, StoreError> {
        let mut lease = self.connector.acquire().await?;
        let result = get_on(&mut lease, &self.schema, key).await;
        lease.release().await;
        result
    }

    async fn insert(&self, record: NewRecord) -> Result<FieldValue, StoreError> {
        let mut lease = self.connector.acquire().await?;
        let result = insert_on(&mut lease, &self.schema, &record).await;
        lease.release().await;
        result
    }

    async fn update(&self, key: &FieldValue, patch: &Patch) -> Result<(), StoreError> {
        let mut lease = self.connector.acquire().await?;
        let result = update_on(&mut lease, &self.schema, key, patch).await;
        lease.release().await;
        result
    }

    async fn delete(&self, key: &FieldValue) -> Result<(), StoreError> {
        let mut lease = self.connector.acquire().await?;
        let result = delete_on(&mut lease, &self.schema, key).await;
        lease.release().await;
        result
    }
}

async fn list_on(conn: &mut PgConnection, schema: &RecordSchema) -> Result<Vec<Record>, StoreError> {
    let sql = sql::list(schema);
    tracing::debug!(collection = %schema.collection(), %sql, "list");

    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    rows.iter()
        .map(|row| decode_row(schema, row).map_err(StoreError::from))
        .collect()
}

async fn get_on(
    conn: &mut PgConnection,
    schema: &RecordSchema,
    key: &FieldValue,
) -> Result<Record, StoreError> {
    let sql = sql::get(schema);
    tracing::debug!(collection = %schema.collection(), %key, "get");

    let row = bind_value(sqlx::query(&sql), schema.key().kind, key)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found(schema, key))?;

    Ok(decode_row(schema, &row)?)
}

async fn insert_on(
    conn: &mut PgConnection,
    schema: &RecordSchema,
    record: &NewRecord,
) -> Result<FieldValue, StoreError> {
    let sql = sql::insert(schema, record.key.is_some());
    tracing::debug!(collection = %schema.collection(), %sql, "insert");

    let mut tx = conn.begin().await?;

    let mut query = sqlx::query(&sql);
    if let Some(key) = &record.key {
        query = bind_value(query, schema.key().kind, key);
    }
    for (def, (_, value)) in schema.mutable_fields().zip(&record.fields) {
        query = bind_value(query, def.kind, value);
    }

    let row = query
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_write(schema, e))?;
    let key = decode_column(&row, 0, schema.key().kind)?;

    // An explicit integer id bypasses the sequence; keep later defaults clear of it
    if matches!(record.key, Some(FieldValue::Integer(_))) {
        let sync = sql::sync_identity(schema);
        sqlx::query(&sync)
            .bind(schema.table().quoted())
            .bind(schema.key().name.as_str())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(key)
}

async fn update_on(
    conn: &mut PgConnection,
    schema: &RecordSchema,
    key: &FieldValue,
    patch: &Patch,
) -> Result<(), StoreError> {
    let key_kind = schema.key().kind;
    let mut tx = conn.begin().await?;

    // Dropping `tx` on an early return rolls back
    let lock = sql::lock_existing(schema);
    bind_value(sqlx::query(&lock), key_kind, key)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found(schema, key))?;

    if let Some(sql) = sql::update(schema, patch) {
        tracing::debug!(collection = %schema.collection(), %key, fields = patch.len(), "update");

        let mut query = sqlx::query(&sql);
        for (name, value) in patch.iter() {
            let kind = schema
                .field(name.as_str())
                .map(|f| f.kind)
                .unwrap_or(FieldKind::Text);
            query = bind_value(query, kind, value);
        }
        bind_value(query, key_kind, key)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_write(schema, e))?;
    }

    tx.commit().await?;
    Ok(())
}

async fn delete_on(
    conn: &mut PgConnection,
    schema: &RecordSchema,
    key: &FieldValue,
) -> Result<(), StoreError> {
    let sql = sql::delete(schema);
    tracing::debug!(collection = %schema.collection(), %key, "delete");

    let result = bind_value(sqlx::query(&sql), schema.key().kind, key)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(schema, key));
    }
    Ok(())
}

/// Bind one value, typing NULL after the column's kind
fn bind_value<'q>(query: PgQuery<'q>, kind: FieldKind, value: &FieldValue) -> PgQuery<'q> {
    match (value, kind) {
        (FieldValue::Integer(i), _) => query.bind(*i),
        (FieldValue::Text(s), _) => query.bind(s.clone()),
        (FieldValue::Null, FieldKind::Integer) => query.bind(None::<i64>),
        (FieldValue::Null, FieldKind::Text) => query.bind(None::<String>),
    }
}

fn decode_row(schema: &RecordSchema, row: &PgRow) -> Result<Record, sqlx::Error> {
    let values = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, def)| decode_column(row, i, def.kind))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Record::from_values(schema, values))
}

fn decode_column(row: &PgRow, index: usize, kind: FieldKind) -> Result<FieldValue, sqlx::Error> {
    Ok(match kind {
        FieldKind::Integer => row
            .try_get::<Option<i64>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Integer),
        FieldKind::Text => row
            .try_get::<Option<String>, _>(index)?
            .map_or(FieldValue::Null, FieldValue::Text),
    })
}

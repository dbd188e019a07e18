//! Table bootstrap for configured collections
//!
//! Creates missing tables only; an existing table is used as-is, whatever
//! its column types, since reads cast every column.

use rowkeep_core::RecordSchema;

use super::lease::Connector;
use crate::store::sql;

/// Create a table for every schema that does not have one yet
pub async fn ensure_tables(connector: &Connector, schemas: &[RecordSchema]) -> Result<(), sqlx::Error> {
    let mut lease = connector.acquire().await?;
    let mut result = Ok(());

    for schema in schemas {
        let ddl = sql::create_table(schema);
        tracing::info!(table = %schema.table(), "ensuring table exists");
        if let Err(e) = sqlx::query(&ddl).execute(&mut *lease).await {
            result = Err(e);
            break;
        }
    }

    lease.release().await;
    result
}

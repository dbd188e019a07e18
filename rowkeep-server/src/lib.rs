//! rowkeep-server: schema-driven record service
//!
//! Serves CRUD endpoints for each configured collection. Persistence goes
//! through the `RecordStore` seam, backed by Postgres or kept in memory.

pub mod db;
pub mod http;
pub mod store;

use std::sync::Arc;

use rowkeep_core::{CoreError, RecordSchema, RowkeepConfig};

pub use http::{build_router, run_server, AppState, ServerConfig};
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore, StoreError};

/// Startup and serving failures
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve collections, connect the store and serve until shutdown.
pub async fn serve(config: RowkeepConfig) -> Result<(), ServerError> {
    let schemas = config.schemas()?;
    let server_config = ServerConfig {
        bind_addr: config.server.bind,
    };

    if config.database.is_memory() {
        tracing::warn!("using in-memory store; records are lost on shutdown");
        let state = AppState::new(memory_stores(schemas));
        run_server(state, server_config).await?;
        return Ok(());
    }

    let connector = db::Connector::connect(
        &config.database.url,
        config.database.connection,
        config.database.max_connections,
    )
    .await?;
    tracing::info!(policy = ?connector.policy(), "connected to store");

    if config.database.create_tables {
        db::ensure_tables(&connector, &schemas).await?;
    }

    let stores = schemas
        .into_iter()
        .map(|schema| Arc::new(PgRecordStore::new(schema, connector.clone())) as Arc<dyn RecordStore>)
        .collect();

    let result = run_server(AppState::new(stores), server_config).await;
    connector.close().await;
    result?;
    Ok(())
}

/// One in-process store per schema
pub fn memory_stores(schemas: Vec<RecordSchema>) -> Vec<Arc<dyn RecordStore>> {
    schemas
        .into_iter()
        .map(|schema| Arc::new(MemoryRecordStore::new(schema)) as Arc<dyn RecordStore>)
        .collect()
}

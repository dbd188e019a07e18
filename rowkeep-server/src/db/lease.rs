//! Scoped store handles
//!
//! Every store operation acquires a `Lease`, runs its statement(s) against
//! the leased connection and then calls [`Lease::release`]. Callers keep the
//! statement work in a separate function so that nothing between acquire
//! and release can return early.

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, PgPool, Postgres};

use rowkeep_core::ConnectionPolicy;

use super::pool::create_pool_with_options;

/// Source of store connections
#[derive(Clone, Debug)]
pub enum Connector {
    /// Leases come from a shared pool
    Pool(PgPool),
    /// Each lease is a freshly opened connection
    PerRequest(PgConnectOptions),
}

impl Connector {
    /// Build a connector for `database_url` under `policy`.
    ///
    /// The pooled variant connects eagerly so a bad URL fails at startup;
    /// the per-request variant only validates the URL.
    pub async fn connect(
        database_url: &str,
        policy: ConnectionPolicy,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let options: PgConnectOptions = database_url.parse()?;
        match policy {
            ConnectionPolicy::Pooled => Ok(Self::Pool(
                create_pool_with_options(options, max_connections).await?,
            )),
            ConnectionPolicy::PerRequest => Ok(Self::PerRequest(options)),
        }
    }

    pub fn policy(&self) -> ConnectionPolicy {
        match self {
            Self::Pool(_) => ConnectionPolicy::Pooled,
            Self::PerRequest(_) => ConnectionPolicy::PerRequest,
        }
    }

    /// Acquire a handle for one operation
    pub async fn acquire(&self) -> Result<Lease, sqlx::Error> {
        match self {
            Self::Pool(pool) => Ok(Lease::Pooled(pool.acquire().await?)),
            Self::PerRequest(options) => Ok(Lease::Fresh(PgConnection::connect_with(options).await?)),
        }
    }

    /// Close the pool, if any, waiting for leased connections to return
    pub async fn close(&self) {
        if let Self::Pool(pool) = self {
            pool.close().await;
        }
    }
}

/// A connection held for the duration of one operation
pub enum Lease {
    Pooled(PoolConnection<Postgres>),
    Fresh(PgConnection),
}

impl Lease {
    /// Give the connection back.
    ///
    /// Pooled connections return to the pool; fresh connections are closed
    /// with a graceful terminate. Close failures are logged, not surfaced:
    /// the operation's own result has already been decided.
    pub async fn release(self) {
        match self {
            Self::Pooled(conn) => drop(conn),
            Self::Fresh(conn) => {
                if let Err(e) = conn.close().await {
                    tracing::warn!(error = %e, "failed to close per-request connection");
                }
            }
        }
    }
}

impl Deref for Lease {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Pooled(conn) => &**conn,
            Self::Fresh(conn) => conn,
        }
    }
}

impl DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Pooled(conn) => &mut **conn,
            Self::Fresh(conn) => conn,
        }
    }
}

//! Database layer - connection acquisition and table bootstrap
//!
//! # Design Principles
//!
//! - One lease per operation, released on every exit path
//! - Pooled or per-request connections, same observable semantics
//! - Rely on DB constraints for duplicate identities

pub mod bootstrap;
pub mod lease;
pub mod pool;

pub use bootstrap::ensure_tables;
pub use lease::{Connector, Lease};
pub use pool::create_pool_with_options;

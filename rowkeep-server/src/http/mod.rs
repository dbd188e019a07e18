//! HTTP server layer
//!
//! Axum server with:
//! - Permissive CORS
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig};
pub use state::AppState;

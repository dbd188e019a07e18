//! API error types with IntoResponse
//!
//! Every failure inside a handler becomes a JSON body
//! `{"error": <code>, "message": <text>}` with a matching status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use rowkeep_core::CoreError;

use crate::store::StoreError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Body value could not be coerced (400)
    InvalidField { message: String },

    /// Path key could not be coerced (400)
    InvalidKey { message: String },

    /// Body is not a JSON object or not JSON at all (400)
    InvalidBody { message: String },

    /// Collection or record not found (404)
    NotFound { message: String },

    /// Duplicate identity (409)
    Conflict { message: String },

    /// Store failure, message passed through (500, logged)
    Store { message: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn unknown_collection(name: &str) -> Self {
        Self::NotFound {
            message: format!("collection '{}' not found", name),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidField { .. } | Self::InvalidKey { .. } | Self::InvalidBody { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Store { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            Self::InvalidField { message } => ("invalid_field", message),
            Self::InvalidKey { message } => ("invalid_key", message),
            Self::InvalidBody { message } => ("invalid_body", message),
            Self::NotFound { message } => ("not_found", message),
            Self::Conflict { message } => ("conflict", message),
            Self::Store { message } => {
                tracing::error!("Store error: {}", message);
                ("store_error", message)
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ("internal_error", "an internal error occurred".to_string())
            }
        };

        let body = json!({
            "error": code,
            "message": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::NotFound {
                message: e.to_string(),
            },
            StoreError::Conflict { .. } => Self::Conflict {
                message: e.to_string(),
            },
            StoreError::Database(inner) => Self::Store {
                message: inner.to_string(),
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        let message = e.to_string();
        match e {
            CoreError::Coercion { .. } => Self::InvalidField { message },
            CoreError::InvalidKey { .. } => Self::InvalidKey { message },
            CoreError::NotAnObject { .. } => Self::InvalidBody { message },
            _ => Self::Internal { message },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rowkeep_core::{FieldDef, FieldKind, FieldValue};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::unknown_collection("nope");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "collection 'nope' not found");
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let err = ApiError::from(StoreError::Conflict {
            collection: "users".into(),
            message: "duplicate key".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn store_error_carries_message() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "store_error");
        assert!(body["message"].as_str().unwrap().contains("pool timed out"));
    }

    #[tokio::test]
    async fn coercion_is_400() {
        let field = FieldDef::new("rating", FieldKind::Integer).unwrap();
        let err = FieldValue::coerce(&field, &serde_json::json!("high")).unwrap_err();
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_field");
    }

    #[test]
    fn bad_key_is_400() {
        let err = FieldValue::parse_key(FieldKind::Integer, "x").unwrap_err();
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
    }
}

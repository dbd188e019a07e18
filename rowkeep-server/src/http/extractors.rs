//! Custom Axum extractors
//!
//! Path extractors resolve the collection against `AppState` and coerce the
//! key to the collection's identity kind, so handlers only see typed values.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use rowkeep_core::FieldValue;

use super::error::ApiError;
use super::state::AppState;
use crate::store::RecordStore;

/// `/{collection}`: the collection's store
pub struct Collection(pub Arc<dyn RecordStore>);

impl FromRequestParts<AppState> for Collection {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(name): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidKey {
                message: e.body_text(),
            })?;

        let store = state
            .collection(&name)
            .ok_or_else(|| ApiError::unknown_collection(&name))?;
        Ok(Self(Arc::clone(store)))
    }
}

/// `/{collection}/{key}`: the store plus the coerced identity
pub struct CollectionKey {
    pub store: Arc<dyn RecordStore>,
    pub key: FieldValue,
}

impl FromRequestParts<AppState> for CollectionKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path((name, raw_key)): Path<(String, String)> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidKey {
                message: e.body_text(),
            })?;

        let store = state
            .collection(&name)
            .ok_or_else(|| ApiError::unknown_collection(&name))?;
        let key = FieldValue::parse_key(store.schema().key().kind, &raw_key)?;

        Ok(Self {
            store: Arc::clone(store),
            key,
        })
    }
}

/// JSON body whose rejections render as `invalid_body`
#[derive(FromRequest, Deserialize)]
#[from_request(via(axum::Json), rejection(ApiError))]
#[serde(transparent)]
pub struct JsonBody(pub JsonValue);

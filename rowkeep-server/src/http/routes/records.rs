//! Record endpoints for every configured collection

use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use rowkeep_core::{FieldValue, NewRecord, Patch, Record};

use crate::http::error::ApiError;
use crate::http::extractors::{Collection, CollectionKey, JsonBody};
use crate::http::state::AppState;

/// Write acknowledgement
#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub status: &'static str,
    pub id: FieldValue,
}

/// GET /{collection} - list all records
async fn list_records(Collection(store): Collection) -> Result<Json<Vec<Record>>, ApiError> {
    let records = store.list().await?;
    Ok(Json(records))
}

/// POST /{collection} - insert a record
async fn create_record(
    Collection(store): Collection,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Acknowledgement>), ApiError> {
    let record = NewRecord::decode(store.schema(), &body)?;
    let id = store.insert(record).await?;
    tracing::info!(collection = %store.schema().collection(), %id, "record inserted");

    Ok((
        StatusCode::CREATED,
        Json(Acknowledgement {
            status: "Successfully Inserted",
            id,
        }),
    ))
}

/// GET /{collection}/{key} - get a single record
async fn get_record(CollectionKey { store, key }: CollectionKey) -> Result<Json<Record>, ApiError> {
    let record = store.get(&key).await?;
    Ok(Json(record))
}

/// PUT /{collection}/{key} - overwrite the supplied fields
async fn update_record(
    CollectionKey { store, key }: CollectionKey,
    JsonBody(body): JsonBody,
) -> Result<Json<Acknowledgement>, ApiError> {
    let patch = Patch::decode(store.schema(), &body)?;
    store.update(&key, &patch).await?;

    Ok(Json(Acknowledgement {
        status: "Successfully Updated",
        id: key,
    }))
}

/// DELETE /{collection}/{key} - remove a record
async fn delete_record(
    CollectionKey { store, key }: CollectionKey,
) -> Result<Json<Acknowledgement>, ApiError> {
    store.delete(&key).await?;

    Ok(Json(Acknowledgement {
        status: "Successfully Deleted",
        id: key,
    }))
}

/// Record routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{collection}", get(list_records).post(create_record))
        .route(
            "/{collection}/{key}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

//! End-to-end handler tests against the in-memory store

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rowkeep_core::Preset;
use rowkeep_server::{build_router, memory_stores, AppState};

fn app() -> Router {
    let users = Preset::Numbered.schema();
    let profiles = Preset::Handle.schema();
    build_router(AppState::new(memory_stores(vec![users, profiles])))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn alice() -> Value {
    json!({
        "id": 1,
        "user": "alice",
        "rating": 1500,
        "rank": 3,
        "win": 2,
        "match": 5,
        "birth": 2000,
        "highest": 1600
    })
}

#[tokio::test]
async fn health_reports_up() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "UP"}));
}

#[tokio::test]
async fn insert_get_update_delete_lifecycle() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/users", Some(alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": "Successfully Inserted", "id": 1}));

    let (status, body) = send(&app, Method::GET, "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, alice());

    let (status, body) = send(&app, Method::PUT, "/users/1", Some(json!({"rating": 1600}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Successfully Updated", "id": 1}));

    let (_, body) = send(&app, Method::GET, "/users/1", None).await;
    let mut expected = alice();
    expected["rating"] = json!(1600);
    assert_eq!(body, expected);

    let (status, body) = send(&app, Method::DELETE, "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Successfully Deleted", "id": 1}));

    let (status, body) = send(&app, Method::GET, "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn empty_collection_lists_as_empty_array() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_returns_inserted_records() {
    let app = app();
    send(&app, Method::POST, "/users", Some(alice())).await;
    send(&app, Method::POST, "/users", Some(json!({"user": "bob"}))).await;

    let (status, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["user"], "bob");
    assert_eq!(rows[1]["id"], 2);
    assert_eq!(rows[1]["rating"], 0);
}

#[tokio::test]
async fn duplicate_identity_conflicts() {
    let app = app();
    send(&app, Method::POST, "/users", Some(alice())).await;

    let mut again = alice();
    again["user"] = json!("mallory");
    let (status, body) = send(&app, Method::POST, "/users", Some(again)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, stored) = send(&app, Method::GET, "/users/1", None).await;
    assert_eq!(stored["user"], "alice");
}

#[tokio::test]
async fn missing_key_is_not_found_for_every_keyed_route() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, "/users/42", Some(json!({"rating": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_collection_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn non_numeric_key_is_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_key");
}

#[tokio::test]
async fn uncoercible_field_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"id": 7, "rating": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_field");
}

#[tokio::test]
async fn malformed_json_is_invalid_body() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn non_object_body_is_invalid_body() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/users", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn update_ignores_identity_and_unknown_keys() {
    let app = app();
    send(&app, Method::POST, "/users", Some(alice())).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/users/1",
        Some(json!({"id": 99, "colour": "blue", "win": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/users/1", None).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["win"], 3);
    assert!(body.get("colour").is_none());

    let (status, _) = send(&app, Method::GET, "/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handle_collection_uses_text_identity() {
    let app = app();
    let profile = json!({
        "handle": "tourist",
        "rank": "legendary grandmaster",
        "rating": 3800,
        "max_rank": "legendary grandmaster",
        "max_rating": 4000,
        "contribution": 100,
        "friend_of_count": 50000,
        "win": 10,
        "match": 12
    });

    let (status, body) = send(&app, Method::POST, "/profiles", Some(profile.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "tourist");

    let (status, body) = send(&app, Method::GET, "/profiles/tourist", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, profile);

    let (status, _) = send(&app, Method::DELETE, "/profiles/tourist", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app();
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn empty_update_is_a_no_op_on_existing_rows_only() {
    let app = app();
    send(&app, Method::POST, "/users", Some(alice())).await;

    let (status, body) = send(&app, Method::PUT, "/users/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Successfully Updated", "id": 1}));

    let (_, stored) = send(&app, Method::GET, "/users/1", None).await;
    assert_eq!(stored, alice());

    let (status, body) = send(&app, Method::PUT, "/users/2", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn missing_content_type_is_invalid_body() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .body(Body::from(alice().to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_body");

    let (_, rows) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn null_id_is_assigned_by_the_store() {
    let app = app();
    send(&app, Method::POST, "/users", Some(alice())).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"id": null, "user": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);

    let (_, stored) = send(&app, Method::GET, "/users/2", None).await;
    assert_eq!(stored["user"], "bob");
}

//! Common test utilities for integration tests.

use axum::{
    body::Body,
    http::{Method, StatusCode},
    Router,
};
use gallery_api::{ApiServer, AppState};
use gallery_core::db::{
    create_pool_with_options, run_migrations, run_warehouse_migrations, DbPool, PoolOptions,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Creates an in-memory SQLite database with both schemas applied.
pub async fn setup_test_db() -> DbPool {
    let pool = create_pool_with_options(
        "sqlite::memory:",
        PoolOptions {
            max_connections: 1,
            min_connections: 1,
            max_lifetime: None,
            idle_timeout: None,
            ..PoolOptions::default()
        },
    )
    .await
    .expect("Failed to create SQLite pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run operational migrations");
    run_warehouse_migrations(&pool)
        .await
        .expect("Failed to run warehouse migrations");
    pool
}

/// Creates an AppState where the warehouse shares the operational database.
pub async fn create_test_state() -> AppState {
    AppState::single(setup_test_db().await)
}

/// Creates the router with its full middleware stack.
pub async fn create_test_router() -> (Router, AppState) {
    let state = create_test_state().await;
    let router = ApiServer::with_state(state.clone()).router();
    (router, state)
}

/// Helper to make GET requests.
pub fn get_request(uri: &str) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to make POST requests with JSON body.
pub fn post_json_request(uri: &str, body: &Value) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make PUT requests with JSON body.
pub fn put_json_request(uri: &str, body: &Value) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make DELETE requests.
pub fn delete_request(uri: &str) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Sends request and parses JSON response.
pub async fn send_request<T: DeserializeOwned>(
    app: Router,
    request: axum::extract::Request<Body>,
) -> (StatusCode, T) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: T = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "Failed to parse response: {} - Body: {:?}",
            e,
            String::from_utf8_lossy(&body)
        )
    });
    (status, parsed)
}

/// Sends request and returns raw response body.
pub async fn send_request_raw(
    app: Router,
    request: axum::extract::Request<Body>,
) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).to_string())
}

// ============================================================================
// Fixtures
// ============================================================================

/// Creates an artwork and returns its JSON representation.
pub async fn create_artwork(app: &Router, title: &str, category: &str, value: f64) -> Value {
    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/artworks",
            &json!({
                "title": title,
                "artist": "Test Artist",
                "yearCreated": 1890,
                "category": category,
                "estimatedValue": value
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "artwork creation failed: {body}");
    body
}

/// Creates an exhibition and returns its JSON representation.
pub async fn create_exhibition(app: &Router, title: &str, status: &str) -> Value {
    let (code, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/exhibitions",
            &json!({
                "title": title,
                "startDate": "2024-03-01",
                "endDate": "2024-06-30",
                "galleryRoom": "East Wing",
                "status": status
            }),
        ),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "exhibition creation failed: {body}");
    body
}

/// Creates a visitor and returns its JSON representation.
pub async fn create_visitor(app: &Router, email: &str) -> Value {
    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/visitors",
            &json!({
                "firstName": "Ada",
                "lastName": "Byron",
                "email": email
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "visitor creation failed: {body}");
    body
}

/// Extracts the `id` field of a created resource.
pub fn id_of(resource: &Value) -> String {
    resource["id"]
        .as_str()
        .expect("resource should have an id")
        .to_string()
}

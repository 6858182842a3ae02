//! Error envelope integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{
    create_artwork, create_test_router, get_request, id_of, post_json_request, send_request,
};

#[tokio::test]
async fn test_envelope_carries_request_id_from_header() {
    let (app, _state) = create_test_router().await;

    let request = axum::extract::Request::builder()
        .uri("/api/artworks/not-a-uuid")
        .header("x-request-id", "trace-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["requestId"], "trace-42");
    assert!(body["timestamp"].is_string());
    assert!(body["validationErrors"].is_array());
}

#[tokio::test]
async fn test_validation_errors_use_camel_case_fields() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/artworks",
            &json!({
                "title": "",
                "artist": "Someone",
                "category": "painting",
                "estimatedValue": -5.0
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["estimatedValue", "title"]);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _state) = create_test_router().await;

    let request = axum::extract::Request::builder()
        .method("POST")
        .uri("/api/artworks")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();
    let (status, body): (StatusCode, Value) = send_request(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn test_unique_violation_maps_to_conflict_with_ora_code() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Insured Piece", "painting", 1000.0).await);

    let policy = json!({
        "artworkId": artwork,
        "provider": "Lloyd's",
        "policyNumber": "POL-001",
        "coverageAmount": 1000.0,
        "premium": 50.0,
        "startDate": "2024-01-01",
        "endDate": "2024-12-31"
    });

    let (status, _): (StatusCode, Value) =
        send_request(app.clone(), post_json_request("/api/insurances", &policy)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body): (StatusCode, Value) =
        send_request(app, post_json_request("/api/insurances", &policy)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], "ORA-00001");
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) =
        send_request(app, get_request("/api/sculptures")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert!(body["requestId"].is_string());
}

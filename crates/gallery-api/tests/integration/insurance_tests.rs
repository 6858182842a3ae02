//! Insurance policy endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_test_router, delete_request, get_request, id_of, post_json_request,
    put_json_request, send_request, send_request_raw,
};

fn policy_body(artwork_id: &str, policy_number: &str) -> Value {
    json!({
        "artworkId": artwork_id,
        "provider": "Lloyd's",
        "policyNumber": policy_number,
        "coverageAmount": 1_000_000.0,
        "premium": 4200.0,
        "startDate": "2024-01-01",
        "endDate": "2024-12-31"
    })
}

#[tokio::test]
async fn test_insurance_crud() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Water Lilies", "painting", 900_000.0).await);

    let (status, created): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/insurances", &policy_body(&artwork, "POL-001")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "active");
    assert_eq!(created["artworkId"], artwork);
    let id = id_of(&created);

    let (status, updated): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/insurances/{id}"),
            &json!({ "status": "expired", "premium": 3900.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "expired");
    assert_eq!(updated["premium"], 3900.0);

    let (status, list): (StatusCode, Value) = send_request(
        app.clone(),
        get_request(&format!("/api/artworks/{artwork}/insurances")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/insurances/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _): (StatusCode, Value) =
        send_request(app, get_request(&format!("/api/insurances/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_policy_number_conflicts() {
    let (app, _state) = create_test_router().await;
    let first = id_of(&create_artwork(&app, "First", "painting", 10.0).await);
    let second = id_of(&create_artwork(&app, "Second", "painting", 10.0).await);

    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/insurances", &policy_body(&first, "POL-DUP")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request("/api/insurances", &policy_body(&second, "POL-DUP")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], "ORA-00001");
}

#[tokio::test]
async fn test_policy_end_before_start_is_rejected() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Backwards", "print", 10.0).await);

    let mut body = policy_body(&artwork, "POL-BACK");
    body["startDate"] = json!("2024-06-01");
    body["endDate"] = json!("2024-05-31");

    let (status, body): (StatusCode, Value) =
        send_request(app, post_json_request("/api/insurances", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validationErrors"][0]["field"], "endDate");
}

#[tokio::test]
async fn test_policy_for_missing_artwork_is_not_found() {
    let (app, _state) = create_test_router().await;

    let (status, _): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/insurances",
            &policy_body("00000000-0000-0000-0000-000000000002", "POL-GHOST"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

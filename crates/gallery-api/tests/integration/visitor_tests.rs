//! Visitor and visit endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_exhibition, create_test_router, create_visitor, delete_request, get_request, id_of,
    post_json_request, put_json_request, send_request, send_request_raw,
};

#[tokio::test]
async fn test_visitor_crud() {
    let (app, _state) = create_test_router().await;

    let (status, created): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/visitors",
            &json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
                "membershipType": "premium"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["membershipType"], "premium");
    let id = id_of(&created);

    let (status, fetched): (StatusCode, Value) =
        send_request(app.clone(), get_request(&format!("/api/visitors/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "grace@example.com");

    let (status, updated): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/visitors/{id}"),
            &json!({ "membershipType": "patron", "phone": "+1 555 0100" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["membershipType"], "patron");
    assert_eq!(updated["phone"], "+1 555 0100");

    let (status, list): (StatusCode, Value) =
        send_request(app.clone(), get_request("/api/visitors")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/visitors/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body): (StatusCode, Value) =
        send_request(app, get_request(&format!("/api/visitors/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

#[tokio::test]
async fn test_duplicate_visitor_email_conflicts() {
    let (app, _state) = create_test_router().await;
    create_visitor(&app, "ada@example.com").await;
    let other = id_of(&create_visitor(&app, "charles@example.com").await);

    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/visitors",
            &json!({ "firstName": "Ada", "lastName": "Again", "email": "ada@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);

    // Moving another visitor onto a taken email conflicts too.
    let (status, _): (StatusCode, Value) = send_request(
        app,
        put_json_request(
            &format!("/api/visitors/{other}"),
            &json!({ "email": "ada@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_soft_deleted_visitor_email_can_be_reused() {
    let (app, _state) = create_test_router().await;
    let first = id_of(&create_visitor(&app, "reuse@example.com").await);

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/visitors/{first}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let second = id_of(&create_visitor(&app, "reuse@example.com").await);
    assert_ne!(first, second);

    let (status, list): (StatusCode, Value) =
        send_request(app, get_request("/api/visitors")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["id"], second);
}

#[tokio::test]
async fn test_invalid_visitor_email_is_rejected() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/visitors",
            &json!({ "firstName": "No", "lastName": "Mail", "email": "not-an-email" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validationErrors"][0]["field"], "email");
}

#[tokio::test]
async fn test_visits_are_recorded_and_listed() {
    let (app, _state) = create_test_router().await;
    let visitor = id_of(&create_visitor(&app, "visits@example.com").await);
    let exhibition = id_of(&create_exhibition(&app, "Spring Show", "active").await);

    let (status, visit): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            &format!("/api/visitors/{visitor}/visits"),
            &json!({ "exhibitionId": exhibition, "visitDate": "2024-04-02", "ticketPrice": 18.5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(visit["visitorId"], visitor);
    assert_eq!(visit["exhibitionId"], exhibition);

    // General admission has no exhibition.
    let (status, visit): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            &format!("/api/visitors/{visitor}/visits"),
            &json!({ "visitDate": "2024-04-09", "ticketPrice": 12.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(visit["exhibitionId"].is_null());

    let (status, list): (StatusCode, Value) = send_request(
        app,
        get_request(&format!("/api/visitors/{visitor}/visits")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 2);
}

#[tokio::test]
async fn test_visit_requires_existing_visitor_and_exhibition() {
    let (app, _state) = create_test_router().await;
    let visitor = id_of(&create_visitor(&app, "lost@example.com").await);
    let missing = "00000000-0000-0000-0000-000000000001";

    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            &format!("/api/visitors/{visitor}/visits"),
            &json!({ "exhibitionId": missing, "visitDate": "2024-04-02", "ticketPrice": 10.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _): (StatusCode, Value) = send_request(
        app,
        get_request(&format!("/api/visitors/{missing}/visits")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

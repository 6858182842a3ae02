//! Restoration endpoint integration tests.

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_test_router, delete_request, get_request, id_of, post_json_request,
    put_json_request, send_request, send_request_raw,
};

async fn create_conservator(app: &Router) -> String {
    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/staff",
            &json!({
                "firstName": "Rosa",
                "lastName": "Lowinger",
                "email": "rosa@gallery.org",
                "role": "conservator",
                "hireDate": "2015-02-01"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "staff creation failed: {body}");
    id_of(&body)
}

#[tokio::test]
async fn test_restoration_crud() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Night Watch", "painting", 5000.0).await);
    let conservator = create_conservator(&app).await;

    let (status, created): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/restorations",
            &json!({
                "artworkId": artwork,
                "conservatorId": conservator,
                "description": "Varnish removal",
                "startDate": "2024-02-01",
                "cost": 12000.0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "scheduled");
    assert_eq!(created["conservatorId"], conservator);
    assert!(created["durationDays"].is_null());
    let id = id_of(&created);

    let (status, updated): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/restorations/{id}"),
            &json!({ "endDate": "2024-03-02", "status": "completed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["durationDays"], 30);

    let (status, list): (StatusCode, Value) = send_request(
        app.clone(),
        get_request(&format!("/api/artworks/{artwork}/restorations")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/restorations/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _): (StatusCode, Value) =
        send_request(app, get_request(&format!("/api/restorations/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restoration_end_before_start_is_rejected() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Cracked Panel", "painting", 10.0).await);

    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/restorations",
            &json!({
                "artworkId": artwork,
                "description": "Panel repair",
                "startDate": "2024-05-10",
                "endDate": "2024-05-01"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validationErrors"][0]["field"], "endDate");

    // Same check applies when an update moves the end date.
    let (status, created): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/restorations",
            &json!({
                "artworkId": artwork,
                "description": "Panel repair",
                "startDate": "2024-05-10"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _): (StatusCode, Value) = send_request(
        app,
        put_json_request(
            &format!("/api/restorations/{}", id_of(&created)),
            &json!({ "endDate": "2024-05-09" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_restoration_with_unknown_conservator_is_not_found() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Orphan", "sculpture", 10.0).await);

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/restorations",
            &json!({
                "artworkId": artwork,
                "conservatorId": "00000000-0000-0000-0000-000000000003",
                "description": "Cleaning",
                "startDate": "2024-01-15"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

//! Artwork endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_test_router, delete_request, get_request, id_of, post_json_request,
    put_json_request, send_request, send_request_raw,
};

#[tokio::test]
async fn test_artwork_crud_lifecycle() {
    let (app, _state) = create_test_router().await;

    let created = create_artwork(&app, "Starry Night", "painting", 1_000_000.0).await;
    let id = id_of(&created);
    assert_eq!(created["status"], "available");
    assert_eq!(created["estimatedValue"], 1_000_000.0);

    let (status, fetched): (StatusCode, Value) =
        send_request(app.clone(), get_request(&format!("/api/v1/artworks/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Starry Night");

    let (status, updated): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/artworks/{id}"),
            &json!({ "location": "Room 4", "status": "on_display" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location"], "Room 4");
    assert_eq!(updated["status"], "on_display");
    assert_eq!(updated["title"], "Starry Night");

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/artworks/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body): (StatusCode, Value) =
        send_request(app, get_request(&format!("/api/artworks/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

#[tokio::test]
async fn test_list_artworks_filters_and_paginates() {
    let (app, _state) = create_test_router().await;

    create_artwork(&app, "Water Lilies", "painting", 500.0).await;
    create_artwork(&app, "The Thinker", "sculpture", 800.0).await;
    create_artwork(&app, "Haystacks", "painting", 300.0).await;

    let (status, page): (StatusCode, Value) = send_request(
        app.clone(),
        get_request("/api/artworks?category=painting&per_page=1&page=2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (status, page): (StatusCode, Value) =
        send_request(app, get_request("/api/artworks?search=thinker")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "The Thinker");
}

#[tokio::test]
async fn test_create_artwork_rejects_future_year() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/artworks",
            &json!({
                "title": "Tomorrow",
                "artist": "Nobody",
                "yearCreated": 9999,
                "category": "painting",
                "estimatedValue": 10.0
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validationErrors"][0]["field"], "yearCreated");
}

#[tokio::test]
async fn test_artwork_history_requires_existing_artwork() {
    let (app, _state) = create_test_router().await;

    let (status, _) = send_request_raw(
        app,
        get_request("/api/artworks/00000000-0000-0000-0000-000000000001/loans"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

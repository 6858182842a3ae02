//! Exhibition endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_exhibition, create_test_router, delete_request, get_request, id_of,
    post_json_request, send_request, send_request_raw,
};

#[tokio::test]
async fn test_exhibition_artwork_placement() {
    let (app, _state) = create_test_router().await;

    let exhibition = id_of(&create_exhibition(&app, "Impressionists", "planned").await);
    let first = id_of(&create_artwork(&app, "Water Lilies", "painting", 500.0).await);
    let second = id_of(&create_artwork(&app, "Haystacks", "painting", 300.0).await);

    let uri = format!("/api/exhibitions/{exhibition}/artworks");
    let (status, placed): (StatusCode, Value) =
        send_request(app.clone(), post_json_request(&uri, &json!({ "artworkId": first }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["displayOrder"], 1);

    let (status, placed): (StatusCode, Value) =
        send_request(app.clone(), post_json_request(&uri, &json!({ "artworkId": second }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["displayOrder"], 2);

    let (status, body): (StatusCode, Value) =
        send_request(app.clone(), post_json_request(&uri, &json!({ "artworkId": first }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);

    let (status, listed): (StatusCode, Value) = send_request(app.clone(), get_request(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["artwork"]["title"], "Water Lilies");

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("{uri}/{first}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed): (StatusCode, Value) = send_request(app, get_request(&uri)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_completed_exhibition_rejects_artworks() {
    let (app, _state) = create_test_router().await;

    let exhibition = id_of(&create_exhibition(&app, "Closed Show", "completed").await);
    let artwork = id_of(&create_artwork(&app, "Late Arrival", "drawing", 50.0).await);

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            &format!("/api/exhibitions/{exhibition}/artworks"),
            &json!({ "artworkId": artwork }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["statusCode"], 422);
}

#[tokio::test]
async fn test_exhibition_end_before_start_is_rejected() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/exhibitions",
            &json!({
                "title": "Backwards",
                "startDate": "2024-06-30",
                "endDate": "2024-03-01"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validationErrors"][0]["field"], "endDate");
}

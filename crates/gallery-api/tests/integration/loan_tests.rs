//! Loan endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_test_router, delete_request, id_of, post_json_request,
    put_json_request, send_request, send_request_raw,
};

fn loan_body(artwork_id: &str, start: &str, end: &str, status: &str) -> Value {
    json!({
        "artworkId": artwork_id,
        "institution": "Museo del Prado",
        "direction": "outgoing",
        "startDate": start,
        "endDate": end,
        "loanFee": 2500.0,
        "status": status
    })
}

#[tokio::test]
async fn test_overlapping_loans_are_rejected() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Guernica Study", "drawing", 9000.0).await);

    let (status, first): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/loans",
            &loan_body(&artwork, "2024-01-01", "2024-03-31", "approved"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/loans",
            &loan_body(&artwork, "2024-03-01", "2024-05-31", "requested"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["statusCode"], 422);

    // Back-to-back loans do not overlap.
    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/loans",
            &loan_body(&artwork, "2024-04-01", "2024-05-31", "requested"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Updating a loan never conflicts with itself.
    let (status, updated): (StatusCode, Value) = send_request(
        app,
        put_json_request(
            &format!("/api/loans/{}", id_of(&first)),
            &json!({ "endDate": "2024-03-15", "status": "active" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "active");
}

#[tokio::test]
async fn test_artwork_in_restoration_cannot_be_loaned() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Fragile Fresco", "painting", 100.0).await);

    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/artworks/{artwork}"),
            &json!({ "status": "in_restoration" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _): (StatusCode, Value) = send_request(
        app,
        post_json_request(
            "/api/loans",
            &loan_body(&artwork, "2024-01-01", "2024-02-01", "requested"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_artwork_with_active_loan_cannot_be_deleted() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Travelling Piece", "sculpture", 700.0).await);

    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/loans",
            &loan_body(&artwork, "2024-01-01", "2024-12-31", "active"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
        send_request_raw(app, delete_request(&format!("/api/artworks/{artwork}"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

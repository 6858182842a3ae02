//! Warehouse sync endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_test_router, get_request, id_of, post_json_request, send_request,
    send_request_raw,
};

#[tokio::test]
async fn test_sync_is_recorded_in_history() {
    let (app, _state) = create_test_router().await;
    create_artwork(&app, "Synced", "painting", 10.0).await;

    let (status, run): (StatusCode, Value) =
        send_request(app.clone(), post_json_request("/api/etl/sync", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "succeeded");
    assert!(run["rowsProcessed"].as_i64().unwrap() >= 1);
    assert!(run["finishedAt"].is_string());

    let (status, history): (StatusCode, Value) =
        send_request(app.clone(), get_request("/api/etl/syncs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 1);

    let (status, fetched): (StatusCode, Value) = send_request(
        app,
        get_request(&format!("/api/etl/syncs/{}", id_of(&run))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], run["id"]);
}

#[tokio::test]
async fn test_unknown_sync_is_not_found() {
    let (app, _state) = create_test_router().await;

    let (status, _) = send_request_raw(
        app,
        get_request("/api/etl/syncs/00000000-0000-0000-0000-0000000000ff"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

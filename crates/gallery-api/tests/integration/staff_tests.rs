//! Staff endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{
    create_test_router, delete_request, get_request, id_of, post_json_request, put_json_request,
    send_request, send_request_raw,
};

fn staff_body(email: &str, role: &str) -> Value {
    json!({
        "firstName": "Mary",
        "lastName": "Anning",
        "email": email,
        "role": role,
        "department": "Conservation",
        "hireDate": "2019-09-01",
        "salary": 52000.0
    })
}

#[tokio::test]
async fn test_staff_crud() {
    let (app, _state) = create_test_router().await;

    let (status, created): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/staff", &staff_body("mary@gallery.org", "conservator")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "conservator");
    assert_eq!(created["hireDate"], "2019-09-01");
    let id = id_of(&created);

    let (status, updated): (StatusCode, Value) = send_request(
        app.clone(),
        put_json_request(
            &format!("/api/staff/{id}"),
            &json!({ "role": "curator", "salary": 61000.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "curator");
    assert_eq!(updated["salary"], 61000.0);
    assert_eq!(updated["email"], "mary@gallery.org");

    let (status, list): (StatusCode, Value) =
        send_request(app.clone(), get_request("/api/staff?role=curator")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, list): (StatusCode, Value) =
        send_request(app.clone(), get_request("/api/staff?role=guide")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);

    let (status, _) =
        send_request_raw(app.clone(), delete_request(&format!("/api/staff/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _): (StatusCode, Value) =
        send_request(app, get_request(&format!("/api/staff/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_staff_email_conflicts() {
    let (app, _state) = create_test_router().await;

    let (status, _): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/staff", &staff_body("dup@gallery.org", "guide")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/staff", &staff_body("dup@gallery.org", "security")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);

    let (status, other): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request("/api/staff", &staff_body("other@gallery.org", "registrar")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _): (StatusCode, Value) = send_request(
        app,
        put_json_request(
            &format!("/api/staff/{}", id_of(&other)),
            &json!({ "email": "dup@gallery.org" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_staff_role_is_rejected() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        post_json_request("/api/staff", &staff_body("role@gallery.org", "janitor")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
}

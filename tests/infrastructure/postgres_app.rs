use crate::common::{self, error_detail, send, signed_in_user};

use axum::http::StatusCode;
use crudkit::infrastructure::mailer::OutboxMailer;
use crudkit::infrastructure::state::AppState;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_account_flow_on_postgres() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let mailer = OutboxMailer::new();
    let mut state = AppState::postgres(common::test_config(), pool.clone()).unwrap();
    state.mailer = Arc::new(mailer.clone());
    let app = crudkit::presentation::router::app(state).unwrap();

    let token = signed_in_user(&app, &mailer, "John@Example.com").await;

    let (status, body) = send(&app, "GET", "/api/user/validate", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "john@example.com");
    assert_eq!(body["confirmed"], true);

    let (status, body) = send(
        &app,
        "POST",
        "/api/user/register",
        Some(json!({ "username": "JOHN@example.com", "password": "Abcdef1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_detail(&body), "john@example.com exist");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_todo_crud_on_postgres() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let state = AppState::postgres(common::test_config(), pool.clone()).unwrap();
    let app = crudkit::presentation::router::app(state).unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/todo",
        Some(json!({ "description": "Buy milk" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/todo",
        Some(json!({ "id": id, "isComplete": true })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    // {"isComplete":true}
    let (status, body) = send(
        &app,
        "GET",
        "/api/todo/pagination?pageSize=10&filter=%7B%22isComplete%22%3Atrue%7D",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], id);

    let (status, body) = send(&app, "DELETE", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    common::cleanup_test_db(&pool).await;
}

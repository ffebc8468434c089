use crate::common::{self, error_detail, send};

use axum::http::StatusCode;
use serde_json::json;

async fn create(app: &axum::Router, description: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/todo",
        Some(json!({ "description": description })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_todo() {
    let (app, _) = common::memory_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/todo",
        Some(json!({ "description": "Buy milk" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["description"], "Buy milk");
    assert_eq!(body["isComplete"], false);
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_create_todo_validation() {
    let (app, _) = common::memory_app();

    let (status, _) = send(&app, "POST", "/api/todo", Some(json!({ "description": "" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/todo", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_todo_by_id() {
    let (app, _) = common::memory_app();
    let id = create(&app, "Buy milk").await;

    let (status, body) = send(&app, "GET", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Buy milk");

    let (status, body) = send(&app, "GET", "/api/todo/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_detail(&body), "Todo not found");

    let (status, body) = send(&app, "GET", "/api/todo/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_detail(&body), "Invalid id");
}

#[tokio::test]
async fn test_list_with_filter() {
    let (app, _) = common::memory_app();
    create(&app, "first").await;
    let done = create(&app, "second").await;
    create(&app, "third").await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/todo",
        Some(json!({ "id": done, "isComplete": true })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/todo", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    // {"isComplete":true}
    let (status, body) = send(
        &app,
        "GET",
        "/api/todo?filter=%7B%22isComplete%22%3Atrue%7D",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let todos = body.as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["description"], "second");

    // {"order":{"id":"desc"},"take":2}
    let (status, body) = send(
        &app,
        "GET",
        "/api/todo?filter=%7B%22order%22%3A%7B%22id%22%3A%22desc%22%7D%2C%22take%22%3A2%7D",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let todos = body.as_array().unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0]["description"], "third");
}

#[tokio::test]
async fn test_list_with_invalid_filter() {
    let (app, _) = common::memory_app();

    // {"owner":1}
    let (status, body) = send(&app, "GET", "/api/todo?filter=%7B%22owner%22%3A1%7D", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_detail(&body).contains("unknown field"));

    let (status, _) = send(&app, "GET", "/api/todo?filter=%7B", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_count_and_pagination() {
    let (app, _) = common::memory_app();
    for i in 0..5 {
        create(&app, &format!("todo {}", i)).await;
    }

    let (status, body) = send(&app, "GET", "/api/todo/count", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, 5);

    let (status, body) = send(
        &app,
        "GET",
        "/api/todo/pagination?pageSize=2&pageNumber=3",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 5);
    assert_eq!(body["data"][0]["description"], "todo 4");

    let (status, _) = send(&app, "GET", "/api/todo/pagination?pageSize=x", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pagination_extreme_values() {
    let (app, _) = common::memory_app();
    for i in 0..3 {
        create(&app, &format!("todo {}", i)).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/todo/pagination?pageNumber=9223372036854775807",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 3);

    let (status, body) = send(&app, "GET", "/api/todo/pagination?pageSize=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_detail(&body), "pageSize must be at least 1");
}

#[tokio::test]
async fn test_update_or_create() {
    let (app, _) = common::memory_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/todo",
        Some(json!({ "description": "new" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/todo",
        Some(json!({ "id": id, "description": "changed", "isComplete": true })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (_, body) = send(&app, "GET", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(body["description"], "changed");
    assert_eq!(body["isComplete"], true);

    // Unknown id creates a new record
    let (status, body) = send(
        &app,
        "PUT",
        "/api/todo",
        Some(json!({ "id": 77, "description": "other" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);

    let (status, body) = send(&app, "PUT", "/api/todo", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_detail(&body), "description is required");
}

#[tokio::test]
async fn test_partial_update() {
    let (app, _) = common::memory_app();
    let id = create(&app, "Buy milk").await;

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

    let (_, body) = send(&app, "GET", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(body["description"], "Buy milk");
    assert_eq!(body["isComplete"], true);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/todo",
        Some(json!({ "id": 99, "isComplete": true })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 0);

    let (status, body) = send(&app, "PATCH", "/api/todo", Some(json!({ "isComplete": true })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_detail(&body), "id is required");
}

#[tokio::test]
async fn test_delete_todo() {
    let (app, _) = common::memory_app();
    let id = create(&app, "Buy milk").await;

    let (status, body) = send(&app, "DELETE", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/todo/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 0);

    let (_, body) = send(&app, "GET", "/api/todo/count", None, None).await;
    assert_eq!(body, 0);
}

use crate::common::{self, send};

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
};
use tower::ServiceExt;

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) =
        common::memory_app_with(common::test_config_with(&[("CORS_ALLOWED_ORIGINS", "http://test.com")]));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/todo")
                .header("Origin", "http://test.com")
                .header("Access-Control-Request-Method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin"),
        Some(&HeaderValue::from_static("http://test.com"))
    );
}

#[test]
fn test_invalid_cors_origin_fails_startup() {
    let config = common::test_config_with(&[("CORS_ALLOWED_ORIGINS", "http://a.com,bad\u{7f}origin")]);
    let state = crudkit::infrastructure::state::AppState::in_memory(
        config,
        std::sync::Arc::new(crudkit::infrastructure::mailer::OutboxMailer::new()),
    );

    assert!(crudkit::presentation::router::app(state).is_err());
}

#[tokio::test]
async fn test_rate_limit() {
    let (app, _) = common::memory_app_with(common::test_config_with(&[
        ("RATE_LIMIT_MAX", "2"),
        ("RATE_LIMIT_WINDOW_SECS", "900"),
    ]));

    for _ in 0..2 {
        let (status, _) = send(&app, "GET", "/api/todo/count", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, "GET", "/api/todo/count", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_responses_are_compressed() {
    let (app, _) = common::memory_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/docs/swagger.json")
                .header("accept-encoding", "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-encoding"),
        Some(&HeaderValue::from_static("gzip"))
    );
}

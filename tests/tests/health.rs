//! Health, liveness, and routing-surface tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use integration_tests::setup::TestContext;

#[tokio::test]
async fn health_reports_healthy_when_store_answers() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn health_reports_unhealthy_when_ping_fails() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.store.set_fail_ping(true);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].as_str().unwrap().contains("ping"));
}

#[tokio::test]
async fn health_recovers_after_transient_failure() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.store.set_fail_ping(true);
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    ctx.store.set_fail_ping(false);
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn root_serves_liveness_text() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Consent tracking API is running");
}

#[tokio::test]
async fn unknown_route_returns_404_body() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}

//! Rejection-path tests: validation failures, store failures, and rate
//! limiting on the ingest endpoint.

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use api::middleware::rate_limit::RateLimitConfig;
use integration_tests::fixtures::{submission_with, submission_without, valid_submission};
use integration_tests::setup::TestContext;

#[tokio::test]
async fn rejects_missing_session_id() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_without("session_id"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Invalid or missing session_id"));
    assert_eq!(ctx.store.row_count(), 0);
}

#[tokio::test]
async fn reports_every_violation_in_one_response() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut payload = valid_submission();
    payload["session_id"] = json!("not-a-session");
    payload["device_type"] = json!("Phone");

    let response = server.post("/track").json(&payload).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("Invalid or missing session_id"));
    assert!(message.contains("Invalid device_type"));
}

#[tokio::test]
async fn empty_submission_lists_all_required_fields() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/track").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .to_string();
    for field in [
        "session_id",
        "experiment_run_id",
        "user_id",
        "country",
        "browser",
        "operating_system",
        "device_type",
        "consent_decision",
        "consent_timestamp",
        "permission_decision",
        "decision_timestamp",
    ] {
        assert!(message.contains(field), "missing violation for {field}");
    }
}

#[tokio::test]
async fn rejects_unknown_device_type() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_with("device_type", json!("Phone")))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // "Mobile" is the accepted spelling.
    let response = server
        .post("/track")
        .json(&submission_with("device_type", json!("Mobile")))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn rejects_unknown_consent_decision() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_with("consent_decision", json!("Maybe")))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("Invalid consent_decision"));
}

#[tokio::test]
async fn rejects_zero_user_step() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_with("user_step", json!(0)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("Invalid user_step"));
}

#[tokio::test]
async fn rejects_overlong_ip_address() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_with("ip_address", json!("a".repeat(46))))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("exceeds 45 characters"));
}

#[tokio::test]
async fn type_mismatched_field_gets_the_validation_envelope() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .json(&submission_with("country", json!(123)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["message"].as_str().unwrap().contains("country"));
    assert_eq!(ctx.store.row_count(), 0);
}

#[tokio::test]
async fn unparseable_body_gets_the_validation_envelope() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/track")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn store_failure_returns_500_and_writes_error_log() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.store.set_fail_insert(true);

    let response = server.post("/track").json(&valid_submission()).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    // The failed operation lands in the daily NDJSON log with the
    // original payload attached.
    let log_file = std::fs::read_dir(&ctx.error_log_dir)
        .expect("error log directory was not created")
        .next()
        .expect("error log file was not written")
        .expect("readable dir entry");
    let contents = std::fs::read_to_string(log_file.path()).unwrap();
    let entry: Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(entry["operation"], "insert_tracking_event");
    assert_eq!(entry["payload"]["session_id"], "session_1_abc");

    let _ = std::fs::remove_dir_all(&ctx.error_log_dir);
}

#[tokio::test]
async fn list_failure_returns_500() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.store.set_fail_list(true);

    let response = server.get("/data").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], false);

    let _ = std::fs::remove_dir_all(&ctx.error_log_dir);
}

#[tokio::test]
async fn rate_limit_caps_requests_per_window() {
    let ctx = TestContext::with_rate_limit(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
    });
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..2 {
        let response = server.post("/track").json(&valid_submission()).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server.post("/track").json(&valid_submission()).await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Too many requests, please try again later");
    assert!(response.headers().contains_key("Retry-After"));

    // Nothing past the quota reaches the store.
    assert_eq!(ctx.store.row_count(), 2);
}

#[tokio::test]
async fn rate_limit_does_not_gate_reads() {
    let ctx = TestContext::with_rate_limit(RateLimitConfig {
        max_requests: 1,
        window: Duration::from_secs(60),
    });
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.post("/track").json(&valid_submission()).await;

    for _ in 0..3 {
        let response = server.get("/data").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}

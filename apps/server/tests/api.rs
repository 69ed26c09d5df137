use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use sellerledger_server::{api::app_router, build_state, config::Config};

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let vars: HashMap<String, String> = [
        ("SP_API_MARKETPLACE_ID", "ATVPDKIKX0DER"),
        ("SP_API_CLIENT_ID", "client"),
        ("SP_API_CLIENT_SECRET", "secret"),
        ("SP_API_REFRESH_TOKEN", "token"),
        ("SP_API_ENDPOINT", "http://127.0.0.1:9"),
        (
            "SL_DB_PATH",
            tmp.path().join("test.db").to_str().unwrap(),
        ),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
    let state = build_state(&config).await.unwrap();
    (app_router(state), tmp)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_reports_ok_without_runs() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(&app, get("/api/v1/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["lastSyncStatus"].is_null());
}

#[tokio::test]
async fn run_endpoints_on_empty_ledger() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(&app, get("/api/v1/sync/runs?limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));

    let (status, body) = send(&app, get("/api/v1/sync/runs/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(&app, get("/api/v1/sync/runs/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_sync_request_is_rejected_before_the_ledger() {
    let (app, _tmp) = build_test_router().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sync")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"runType":"orders","pageSize":500}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (_, runs) = send(&app, get("/api/v1/sync/runs")).await;
    assert_eq!(runs, Value::Array(vec![]));
}

#[tokio::test]
async fn summaries_validate_the_range() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(
        &app,
        get("/api/v1/summaries?start=2025-01-02&end=2025-01-01"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(
        &app,
        get("/api/v1/summaries?marketplaceId=ATVPDKIKX0DER&start=2025-01-01&end=2025-01-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));
}

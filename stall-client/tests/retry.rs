//! Retry behaviour against a local HTTP server

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use stall_client::{ClientConfig, ClientError, HttpClient};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, retries: u32) -> HttpClient {
    ClientConfig::new(base_url)
        .with_timeout(Duration::from_millis(200))
        .with_retries(retries)
        .with_retry_delay(Duration::from_millis(10), Duration::from_millis(40))
        .build_http_client()
        .unwrap()
}

/// 前两次超时，第三次返回数据
async fn slow_then_ok(State(calls): State<Arc<AtomicU32>>) -> Json<Value> {
    let call = calls.fetch_add(1, Ordering::SeqCst);
    if call < 2 {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    Json(json!({ "success": true, "code": 0, "message": "OK", "data": { "value": 42 } }))
}

async fn always_unavailable(State(calls): State<Arc<AtomicU32>>) -> (StatusCode, Json<Value>) {
    calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "success": false, "code": 9003, "message": "maintenance" })),
    )
}

async fn not_found(State(calls): State<Arc<AtomicU32>>) -> (StatusCode, Json<Value>) {
    calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "code": 4001, "message": "Order not found" })),
    )
}

#[tokio::test]
async fn test_timeouts_are_retried_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let app = Router::new()
        .route("/slow", get(slow_then_ok))
        .with_state(calls.clone());
    let base = serve(app).await;

    let value: Value = client(&base, 3).get("/slow").await.unwrap();

    assert_eq!(value["value"], 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let calls = Arc::new(AtomicU32::new(0));
    let app = Router::new()
        .route("/down", get(always_unavailable))
        .with_state(calls.clone());
    let base = serve(app).await;

    let err = client(&base, 2).get::<Value>("/down").await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.code(), Some(9003));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let app = Router::new()
        .route("/missing", get(not_found))
        .with_state(calls.clone());
    let base = serve(app).await;

    let err = client(&base, 3).get::<Value>("/missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some(4001));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // 先占用再释放端口，保证无人监听
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr), 1)
        .get::<Value>("/health")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_transient());
}

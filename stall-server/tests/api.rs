//! HTTP 层测试 - 通过 oneshot 直接调用完整路由 (含中间件)

use axum::body::{Body, to_bytes};
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use stall_server::{Config, ServerState};
use tower::ServiceExt;

fn state() -> ServerState {
    ServerState::in_memory(Config::with_overrides("/tmp/stall-api-test", 0)).unwrap()
}

async fn call(state: &ServerState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = state.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn place_order(state: &ServerState, items: Value) -> Value {
    let (status, body) = call(
        state,
        Method::POST,
        "/api/orders",
        Some(json!({ "items": items, "payment_method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let state = state();
    let (status, body) = call(&state, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = call(&state, Method::GET, "/health/detailed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_menu_listing() {
    let state = state();
    let (status, body) = call(&state, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "焼きそば");

    let (_, body) = call(&state, Method::GET, "/api/toppings", None).await;
    assert!(body["data"].as_array().unwrap().len() >= 6);

    let (_, body) = call(&state, Method::GET, "/api/stock", None).await;
    assert_eq!(body["data"][0]["product_id"], 1);
}

#[tokio::test]
async fn test_order_lifecycle_over_http() {
    let state = state();
    let order = place_order(
        &state,
        json!([{ "product_id": 1, "topping_ids": [101], "quantity": 2 }]),
    )
    .await;
    assert_eq!(order["total_amount"], 1300.0);
    assert_eq!(order["status"], "accepted");
    let id = order["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &state,
        Method::PATCH,
        &format!("/api/orders/{id}/status"),
        Some(json!({ "status": "cooking" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cooking");

    // Backwards move is a conflict
    let (status, body) = call(
        &state,
        Method::PATCH,
        &format!("/api/orders/{id}/status"),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 4010);

    // Japanese labels are accepted as input
    let (status, body) = call(
        &state,
        Method::PATCH,
        &format!("/api/orders/{id}/status"),
        Some(json!({ "status": "準備完了" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ready");

    let (_, body) = call(&state, Method::GET, "/api/orders/ready", None).await;
    assert_eq!(body["data"][0]["order_number"], "A001");
    assert_eq!(body["data"][0]["freshness"], "hot");

    let (status, body) = call(&state, Method::GET, "/api/orders/number/a001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
}

#[tokio::test]
async fn test_payment_returns_no_data() {
    let state = state();
    let order = place_order(&state, json!([{ "product_id": 6, "quantity": 1 }])).await;
    let id = order["id"].as_str().unwrap();

    let (status, body) = call(
        &state,
        Method::POST,
        &format!("/api/orders/{id}/payment"),
        Some(json!({ "payment_method": "cash", "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5002);

    let (status, body) = call(
        &state,
        Method::POST,
        &format!("/api/orders/{id}/payment"),
        Some(json!({ "payment_method": "cash", "amount": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_none());

    let (_, body) = call(&state, Method::GET, "/api/orders?payment_status=paid", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = call(&state, Method::GET, "/api/dashboard/summary", None).await;
    assert_eq!(body["data"]["revenue"], 200.0);
    assert_eq!(body["data"]["unpaid"], 0);
}

#[tokio::test]
async fn test_validation_and_not_found() {
    let state = state();

    let (status, body) = call(&state, Method::POST, "/api/orders", Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4007);

    let (status, _) = call(&state, Method::GET, "/api/orders/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let order = place_order(&state, json!([{ "product_id": 2, "quantity": 1 }])).await;
    let id = order["id"].as_str().unwrap();
    let (status, body) = call(
        &state,
        Method::POST,
        &format!("/api/orders/{id}/cancel"),
        Some(json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_reset_and_purge() {
    let state = state();
    let order = place_order(&state, json!([{ "product_id": 3, "quantity": 1 }])).await;
    let id = order["id"].as_str().unwrap();
    call(
        &state,
        Method::POST,
        &format!("/api/orders/{id}/cancel"),
        Some(json!({ "reason": "品切れ" })),
    )
    .await;

    let (status, body) = call(&state, Method::DELETE, "/api/orders/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], 1);

    place_order(&state, json!([{ "product_id": 3, "quantity": 1 }])).await;
    let (status, _) = call(&state, Method::POST, "/api/system/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&state, Method::GET, "/api/orders", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stock_adjust_endpoint() {
    let state = state();
    let (status, body) = call(
        &state,
        Method::POST,
        "/api/stock/4/adjust",
        Some(json!({ "kind": "set", "current": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current"], 2);

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/orders",
        Some(json!({ "items": [{ "product_id": 4, "quantity": 3 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6003);
}

// ========== SSE ==========

#[derive(Debug, Default)]
struct SseFrame {
    event: Option<String>,
    id: Option<String>,
    data: String,
}

async fn open_events(state: &ServerState) -> axum::body::BodyDataStream {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let response = state.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "text/event-stream"
    );
    response.into_body().into_data_stream()
}

/// 读取下一帧，跳过只有注释的 keep-alive；流结束返回 None
async fn next_frame(body: &mut axum::body::BodyDataStream, buf: &mut Vec<u8>) -> Option<SseFrame> {
    use futures::StreamExt;

    loop {
        if let Some(pos) = buf.windows(2).position(|w| w == b"\n\n") {
            let raw: Vec<u8> = buf.drain(..pos + 2).collect();
            let raw = String::from_utf8(raw).unwrap();
            let mut frame = SseFrame::default();
            let mut has_field = false;
            for line in raw.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    frame.event = Some(v.trim().to_string());
                    has_field = true;
                } else if let Some(v) = line.strip_prefix("id:") {
                    frame.id = Some(v.trim().to_string());
                    has_field = true;
                } else if let Some(v) = line.strip_prefix("data:") {
                    frame.data.push_str(v.trim());
                    has_field = true;
                }
            }
            if has_field {
                return Some(frame);
            }
            continue;
        }

        let chunk = tokio::time::timeout(std::time::Duration::from_secs(2), body.next())
            .await
            .expect("no SSE frame within 2s")?;
        buf.extend_from_slice(&chunk.unwrap());
    }
}

#[tokio::test]
async fn test_events_stream_hello_then_notices() {
    let state = state();
    let mut body = open_events(&state).await;
    let mut buf = Vec::new();

    let hello = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(hello.event.as_deref(), Some("hello"));
    assert_eq!(hello.id.as_deref(), Some("1"));
    let data: Value = serde_json::from_str(&hello.data).unwrap();
    assert_eq!(data["version"], 1);

    let order = place_order(
        &state,
        json!([{ "product_id": 2, "topping_ids": [], "quantity": 1 }]),
    )
    .await;
    let version = state.storage.version().unwrap();

    let frame = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(frame.event.as_deref(), Some("order.created"));
    assert_eq!(frame.id, Some(version.to_string()));
    let notice: Value = serde_json::from_str(&frame.data).unwrap();
    assert_eq!(notice["resource"], "order");
    assert_eq!(notice["action"], "created");
    assert_eq!(notice["id"], order["id"]);
    assert_eq!(notice["version"], version);

    let (status, _) = call(
        &state,
        Method::PATCH,
        &format!("/api/orders/{}/status", order["id"].as_str().unwrap()),
        Some(json!({ "status": "cooking" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let frame = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(frame.event.as_deref(), Some("order.status_changed"));
    assert_eq!(frame.id, Some((version + 1).to_string()));
}

#[tokio::test]
async fn test_events_lagging_subscriber_gets_resync() {
    let mut config = Config::with_overrides("/tmp/stall-api-test", 0);
    config.event_channel_capacity = 2;
    let state = ServerState::in_memory(config).unwrap();
    let mut body = open_events(&state).await;
    let mut buf = Vec::new();

    let hello = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(hello.event.as_deref(), Some("hello"));

    // 不读取，直接写满广播通道
    for _ in 0..5 {
        state.reset_data().unwrap();
    }

    let frame = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(frame.event.as_deref(), Some("resync"));
    let data: Value = serde_json::from_str(&frame.data).unwrap();
    assert_eq!(data["skipped"], 3);

    // 之后继续收到未丢失的通知
    let frame = next_frame(&mut body, &mut buf).await.unwrap();
    assert_eq!(frame.event.as_deref(), Some("store.reset"));
}

#[tokio::test]
async fn test_events_stream_ends_on_shutdown() {
    let state = state();
    let mut body = open_events(&state).await;
    let mut buf = Vec::new();

    assert!(next_frame(&mut body, &mut buf).await.is_some());
    assert_eq!(state.message_bus.subscriber_count(), 1);

    state.message_bus.shutdown();
    assert!(next_frame(&mut body, &mut buf).await.is_none());

    drop(body);
    assert_eq!(state.message_bus.subscriber_count(), 0);
}

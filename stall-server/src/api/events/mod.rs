//! 变更推送 (Server-Sent Events)
//!
//! `GET /api/events` 打开后先收到一条 `hello` (当前文档版本)，
//! 之后每次存储提交推送一条事件：
//!
//! ```text
//! event: order.status_changed
//! id: 42
//! data: {"resource":"order","action":"status_changed","id":"...","version":42,...}
//! ```
//!
//! 订阅者落后太多时收到 `resync`，应重新拉取全量数据。服务器关闭时流结束。

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::{Stream, StreamExt, stream};
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::message::{ChangeNotice, SubscriberGuard};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(events))
}

/// 单个 SSE 连接的状态；guard 随流一起释放
struct Subscription {
    rx: broadcast::Receiver<ChangeNotice>,
    shutdown: CancellationToken,
    _guard: SubscriberGuard,
}

/// GET /api/events
pub async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // 先订阅再读版本，避免漏掉中间的提交
    let subscription = Subscription {
        rx: state.message_bus.subscribe(),
        shutdown: state.message_bus.shutdown_token().clone(),
        _guard: state.message_bus.register_subscriber("sse"),
    };
    let version = match state.storage.version() {
        Ok(version) => version,
        Err(e) => {
            // hello 仍然发送，version 0 让客户端做一次全量拉取
            tracing::warn!(error = %e, "Failed to read store version for SSE hello");
            0
        }
    };

    let hello = Event::default()
        .event("hello")
        .id(version.to_string())
        .data(json!({ "version": version }).to_string());

    let updates = stream::unfold(subscription, |mut sub| async move {
        tokio::select! {
            _ = sub.shutdown.cancelled() => None,
            received = sub.rx.recv() => match received {
                Ok(notice) => Some((Ok(notice_event(&notice)), sub)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged, asking for resync");
                    let event = Event::default()
                        .event("resync")
                        .data(json!({ "skipped": skipped }).to_string());
                    Some((Ok(event), sub))
                }
                Err(RecvError::Closed) => None,
            },
        }
    });

    Sse::new(stream::once(async move { Ok(hello) }).chain(updates))
        .keep_alive(KeepAlive::default())
}

fn notice_event(notice: &ChangeNotice) -> Event {
    let data = serde_json::to_string(notice).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode change notice");
        json!({ "version": notice.version }).to_string()
    });
    Event::default()
        .event(notice.event_name())
        .id(notice.version.to_string())
        .data(data)
}

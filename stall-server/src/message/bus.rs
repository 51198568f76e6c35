//! 消息总线核心实现
//!
//! ```text
//! OrdersManager / CatalogService ──▶ publish() ──▶ broadcast::Sender<ChangeNotice>
//!                                                      │
//!                                      ┌───────────────┼───────────────┐
//!                                      ▼               ▼               ▼
//!                                 SSE client      SSE client      in-process
//! ```
//!
//! 订阅者落后超过通道容量时会收到 `Lagged`，应重新拉取全量数据。

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use shared::message::ChangeNotice;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 已连接的推送订阅者
#[derive(Debug, Clone, Serialize)]
pub struct SubscriberInfo {
    pub id: String,
    /// 订阅来源 (例如 "sse")
    pub kind: &'static str,
    pub connected_at: i64,
}

/// 消息总线 - 负责变更通知的广播
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    tx: broadcast::Sender<ChangeNotice>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
    /// 当前连接的推送订阅者 (ID -> 信息)
    subscribers: Arc<DashMap<String, SubscriberInfo>>,
}

impl MessageBus {
    /// 创建默认容量的消息总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
            subscribers: Arc::new(DashMap::new()),
        }
    }

    /// 发布变更通知，返回收到通知的订阅者数量
    ///
    /// 没有订阅者不算错误：写入已经提交，通知只是提示。
    pub fn publish(&self, notice: ChangeNotice) -> usize {
        let event = notice.event_name();
        let version = notice.version;
        match self.tx.send(notice) {
            Ok(receivers) => {
                tracing::debug!(event = %event, version, receivers, "Change notice published");
                receivers
            }
            Err(_) => {
                tracing::trace!(event = %event, version, "Change notice dropped, no subscribers");
                0
            }
        }
    }

    /// 订阅变更通知
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }

    /// 登记一个长连接订阅者，guard 释放时自动注销
    pub fn register_subscriber(&self, kind: &'static str) -> SubscriberGuard {
        let id = uuid::Uuid::new_v4().to_string();
        self.subscribers.insert(
            id.clone(),
            SubscriberInfo {
                id: id.clone(),
                kind,
                connected_at: shared::util::now_millis(),
            },
        );
        tracing::info!(subscriber_id = %id, kind, "Subscriber connected");
        SubscriberGuard {
            id,
            subscribers: self.subscribers.clone(),
        }
    }

    /// 获取已连接订阅者列表
    pub fn subscribers(&self) -> Vec<SubscriberInfo> {
        self.subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭：结束所有推送流
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 订阅者登记凭证
#[derive(Debug)]
pub struct SubscriberGuard {
    id: String,
    subscribers: Arc<DashMap<String, SubscriberInfo>>,
}

impl SubscriberGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
        tracing::info!(subscriber_id = %self.id, "Subscriber disconnected");
    }
}

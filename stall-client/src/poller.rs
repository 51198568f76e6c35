//! 订单轮询
//!
//! 屋台看板 / 取餐屏按固定间隔拉取订单列表，通过 `watch` 通道发布最新快照。
//! 拉取失败时保留上一次成功的数据，只记录错误。

use std::time::Duration;

use async_trait::async_trait;
use shared::order::{Order, OrderQuery};
use shared::util::now_millis;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{ClientResult, StallApi};

/// 订单数据来源
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
    async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>>;
}

#[async_trait]
impl OrderSource for StallApi {
    async fn fetch_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        self.orders(query).await
    }
}

/// 最新一次轮询结果
#[derive(Debug, Clone, Default)]
pub struct PollSnapshot {
    /// 最近一次成功拉取的订单
    pub orders: Vec<Order>,
    /// 最近一次成功拉取的时间 (millis)，从未成功时为 `None`
    pub fetched_at: Option<i64>,
    /// 最近一次失败的用户提示，成功后清空
    pub last_error: Option<String>,
    /// 连续失败次数
    pub consecutive_failures: u32,
}

/// 后台轮询任务句柄
///
/// Drop 不会停止任务，需调用 [`OrderPoller::stop`] 或取消传入的 token。
#[derive(Debug)]
pub struct OrderPoller {
    receiver: watch::Receiver<PollSnapshot>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl OrderPoller {
    /// 启动轮询，首次拉取立即执行
    pub fn spawn<S: OrderSource>(
        source: S,
        query: OrderQuery,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let (sender, receiver) = watch::channel(PollSnapshot::default());
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Order poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                let result = tokio::select! {
                    _ = token.cancelled() => break,
                    result = source.fetch_orders(&query) => result,
                };

                match result {
                    Ok(orders) => {
                        sender.send_modify(|snapshot| {
                            snapshot.orders = orders;
                            snapshot.fetched_at = Some(now_millis());
                            snapshot.last_error = None;
                            snapshot.consecutive_failures = 0;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Order poll failed, keeping last data");
                        sender.send_modify(|snapshot| {
                            snapshot.last_error = Some(e.user_message());
                            snapshot.consecutive_failures += 1;
                        });
                    }
                }
            }
        });

        Self {
            receiver,
            shutdown,
            handle,
        }
    }

    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> PollSnapshot {
        self.receiver.borrow().clone()
    }

    /// 停止轮询并等待任务退出
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Order poller task failed");
        }
    }
}

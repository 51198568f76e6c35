//! OrdersManager - 订单读写入口
//!
//! # Write Flow
//!
//! ```text
//! create_order / update_order_status / record_payment ...
//!     ├─ 1. Begin redb write transaction, load document
//!     ├─ 2. Validate + mutate (lifecycle / builder)
//!     ├─ 3. Bump version, write document, commit
//!     └─ 4. Publish ChangeNotice on the MessageBus
//! ```
//!
//! A failed step 2 drops the transaction; no notice is published.

use crate::core::Config;
use crate::message::MessageBus;
use crate::store::{DocumentStorage, StorageError, StoreDocument};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{ChangeAction, ChangeNotice, Resource};
use shared::order::money;
use shared::order::{
    CreateOrderRequest, FreshnessThresholds, Order, OrderPatch, OrderQuery, OrderStatus,
    OrderSummary, PaymentRequest, PaymentStatus, ReadyOrder,
};
use shared::util::{new_order_id, non_blank, now_millis};

use super::{builder, lifecycle, numbering};

/// Order behaviour knobs taken from [`Config`]
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub order_number_prefix: String,
    pub default_prep_minutes: u32,
    pub freshness: FreshnessThresholds,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            order_number_prefix: "A".to_string(),
            default_prep_minutes: 10,
            freshness: FreshnessThresholds::default(),
        }
    }
}

impl From<&Config> for OrderSettings {
    fn from(config: &Config) -> Self {
        Self {
            order_number_prefix: config.order_number_prefix.clone(),
            default_prep_minutes: config.default_prep_minutes,
            freshness: config.freshness,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrdersManager {
    storage: DocumentStorage,
    bus: MessageBus,
    settings: OrderSettings,
}

impl OrdersManager {
    pub fn new(storage: DocumentStorage, bus: MessageBus, settings: OrderSettings) -> Self {
        Self {
            storage,
            bus,
            settings,
        }
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    // ========== Queries ==========

    /// Orders in creation order, filtered by `query`
    pub fn get_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        let doc = self.storage.load()?;
        Ok(doc
            .orders
            .into_iter()
            .filter(|o| query.matches(o))
            .collect())
    }

    pub fn get_order(&self, id: &str) -> AppResult<Order> {
        let doc = self.storage.load()?;
        doc.order(id)
            .cloned()
            .ok_or_else(|| AppError::order_not_found(id))
    }

    /// Lookup by the short code on the pickup ticket (case-insensitive)
    pub fn get_order_by_number(&self, order_number: &str) -> AppResult<Order> {
        let wanted = numbering::normalize_order_number(order_number);
        let doc = self.storage.load()?;
        doc.orders
            .into_iter()
            .filter(|o| o.order_number.eq_ignore_ascii_case(&wanted))
            .max_by_key(|o| o.created_at)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderNotFound,
                    format!("Order number {} not found", wanted),
                )
                .with_detail("order_number", wanted)
            })
    }

    /// Ready orders, longest waiting first
    pub fn ready_board(&self, now: i64) -> AppResult<Vec<ReadyOrder>> {
        let doc = self.storage.load()?;
        let mut board: Vec<ReadyOrder> = doc
            .orders
            .iter()
            .filter_map(|o| {
                let ready_at = o.ready_at?;
                let waiting_secs = o.waiting_millis(now)? / 1000;
                Some(ReadyOrder {
                    id: o.id.clone(),
                    order_number: o.order_number.clone(),
                    ready_at,
                    waiting_secs,
                    freshness: self.settings.freshness.classify(waiting_secs),
                    is_paid: o.is_paid(),
                })
            })
            .collect();
        board.sort_by_key(|r| r.ready_at);
        Ok(board)
    }

    /// Store monitor counters
    pub fn summary(&self) -> AppResult<OrderSummary> {
        let doc = self.storage.load()?;
        let mut summary = OrderSummary {
            total_orders: doc.orders.len(),
            generated_at: now_millis(),
            ..Default::default()
        };

        let mut paid_totals = Vec::new();
        for order in &doc.orders {
            summary.by_status.bump(order.status);
            if order.status == OrderStatus::Cancelled {
                continue;
            }
            match order.payment_status {
                PaymentStatus::Paid => paid_totals.push(order.total_amount),
                PaymentStatus::Unpaid => summary.unpaid += 1,
            }
        }
        summary.revenue = money::sum(paid_totals);
        summary.low_stock_product_ids = doc
            .stock
            .iter()
            .filter(|s| s.is_low())
            .map(|s| s.product_id)
            .collect();
        Ok(summary)
    }

    // ========== Commands ==========

    /// Snapshot prices, take stock, assign a number and persist
    pub fn create_order(&self, request: CreateOrderRequest) -> AppResult<Order> {
        let settings = &self.settings;
        let request_id = non_blank(request.request_id);
        let result = self.storage.update(|doc: &mut StoreDocument| {
            // 同一 request_id 重试时返回已有订单，事务丢弃不写入
            if let Some(rid) = request_id.as_deref()
                && let Some(existing) = doc
                    .orders
                    .iter()
                    .find(|o| o.request_id.as_deref() == Some(rid))
            {
                return Err(CreateError::Duplicate(Box::new(existing.clone())));
            }

            let now = now_millis();
            let items = builder::build_items(doc, &request.items)?;
            builder::reserve_stock(doc, &items, now)?;
            let order_number = numbering::next_order_number(doc, &settings.order_number_prefix)?;
            let estimated_pickup_at =
                builder::estimate_pickup(doc, &items, now, settings.default_prep_minutes);
            let total_amount = money::sum(items.iter().map(|i| i.line_total));

            let order = Order {
                id: new_order_id(),
                order_number,
                items,
                total_amount,
                status: OrderStatus::Accepted,
                payment_status: PaymentStatus::Unpaid,
                payment_method: request.payment_method,
                paid_amount: 0.0,
                special_instructions: non_blank(request.special_instructions),
                cancellation_reason: None,
                created_at: now,
                updated_at: now,
                estimated_pickup_at,
                cooking_started_at: None,
                ready_at: None,
                picked_up_at: None,
                cancelled_at: None,
                paid_at: None,
                request_id: request_id.clone(),
            };
            doc.orders.push(order.clone());
            Ok(order)
        });

        let (order, version) = match result {
            Ok(created) => created,
            Err(CreateError::Duplicate(existing)) => {
                tracing::info!(
                    order_id = %existing.id,
                    order_number = %existing.order_number,
                    "Repeated checkout, returning existing order"
                );
                return Ok(*existing);
            }
            Err(CreateError::App(e)) => return Err(e),
        };

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = order.total_amount,
            items = order.items.len(),
            "Order created"
        );
        self.notify(ChangeAction::Created, &order, version);
        Ok(order)
    }

    /// Partial update of a non-terminal order
    pub fn update_order(&self, id: &str, patch: OrderPatch) -> AppResult<Order> {
        if patch.is_empty() {
            return self.get_order(id);
        }
        let status_change = patch.status;
        let (order, version) = self.storage.update(|doc: &mut StoreDocument| {
            let now = now_millis();
            let order = doc.order_mut(id)?;
            lifecycle::apply_patch(order, patch, now)?;
            let order = order.clone();
            if order.status == OrderStatus::Cancelled && status_change.is_some() {
                builder::release_stock(doc, &order.items, now);
            }
            Ok::<_, AppError>(order)
        })?;

        let action = match status_change {
            Some(_) => ChangeAction::StatusChanged,
            None => ChangeAction::Updated,
        };
        tracing::info!(order_id = %order.id, status = %order.status, "Order updated");
        self.notify(action, &order, version);
        Ok(order)
    }

    /// Move an order along its lifecycle
    pub fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        reason: Option<String>,
    ) -> AppResult<Order> {
        let (order, version) = self.storage.update(|doc: &mut StoreDocument| {
            let now = now_millis();
            let order = doc.order_mut(id)?;
            let from = order.status;
            lifecycle::apply_status(order, status, reason, now)?;
            let order = order.clone();
            if status == OrderStatus::Cancelled {
                builder::release_stock(doc, &order.items, now);
            }
            tracing::info!(
                order_id = %order.id,
                order_number = %order.order_number,
                from = %from,
                to = %status,
                "Order status changed"
            );
            Ok::<_, AppError>(order)
        })?;

        self.notify(ChangeAction::StatusChanged, &order, version);
        Ok(order)
    }

    /// Cancel with a reason; stock is returned
    pub fn cancel_order(&self, id: &str, reason: String) -> AppResult<Order> {
        self.update_order_status(id, OrderStatus::Cancelled, Some(reason))
    }

    /// Record payment; lifecycle status is unaffected
    pub fn record_payment(&self, id: &str, payment: PaymentRequest) -> AppResult<Order> {
        let (order, version) = self.storage.update(|doc: &mut StoreDocument| {
            let order = doc.order_mut(id)?;
            lifecycle::apply_payment(order, payment.payment_method, payment.amount, now_millis())?;
            Ok::<_, AppError>(order.clone())
        })?;

        tracing::info!(
            order_id = %order.id,
            method = ?payment.payment_method,
            amount = payment.amount,
            "Payment recorded"
        );
        self.notify(ChangeAction::Paid, &order, version);
        Ok(order)
    }

    /// Drop terminal orders last touched before `before` (all when `None`)
    ///
    /// Purged numbers become available again.
    pub fn purge_terminal_orders(&self, before: Option<i64>) -> AppResult<usize> {
        let (purged, version) = self.storage.update(|doc: &mut StoreDocument| {
            let before_len = doc.orders.len();
            doc.orders.retain(|o| {
                !o.is_terminal() || before.is_some_and(|cutoff| o.updated_at >= cutoff)
            });
            Ok::<_, AppError>(before_len - doc.orders.len())
        })?;

        tracing::info!(purged, before = ?before, "Order history purged");
        self.bus.publish(
            ChangeNotice::new(Resource::Store, ChangeAction::Purged, None, version)
                .with_data(&purged),
        );
        Ok(purged)
    }

    fn notify(&self, action: ChangeAction, order: &Order, version: u64) {
        self.bus.publish(
            ChangeNotice::new(Resource::Order, action, Some(order.id.clone()), version)
                .with_data(order),
        );
    }
}

/// `create_order` 事务内的失败原因
enum CreateError {
    Duplicate(Box<Order>),
    App(AppError),
}

impl From<AppError> for CreateError {
    fn from(err: AppError) -> Self {
        CreateError::App(err)
    }
}

impl From<StorageError> for CreateError {
    fn from(err: StorageError) -> Self {
        CreateError::App(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderLineInput, PaymentMethod};
    use std::collections::HashSet;

    fn manager() -> (OrdersManager, MessageBus) {
        let storage = DocumentStorage::open_in_memory().unwrap();
        let bus = MessageBus::new();
        (
            OrdersManager::new(storage, bus.clone(), OrderSettings::default()),
            bus,
        )
    }

    fn request(lines: Vec<(i64, Vec<i64>, u32)>) -> CreateOrderRequest {
        CreateOrderRequest {
            items: lines
                .into_iter()
                .map(|(product_id, topping_ids, quantity)| OrderLineInput {
                    product_id,
                    topping_ids,
                    quantity,
                })
                .collect(),
            payment_method: Some(PaymentMethod::Cash),
            special_instructions: None,
            request_id: None,
        }
    }

    fn stock_of(manager: &OrdersManager, product_id: i64) -> u32 {
        manager
            .storage
            .load()
            .unwrap()
            .stock(product_id)
            .unwrap()
            .current
    }

    #[test]
    fn test_create_order_totals_and_numbers() {
        let (manager, _bus) = manager();
        let order = manager
            .create_order(request(vec![(1, vec![101], 2), (6, vec![], 1)]))
            .unwrap();

        assert_eq!(order.order_number, "A001");
        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        let item_sum: f64 = order.items.iter().map(|i| i.line_total).sum();
        assert_eq!(order.total_amount, item_sum);
        assert_eq!(order.total_amount, 1500.0);
        // 焼きそば is the slowest line at 8 minutes
        assert_eq!(order.estimated_pickup_at, order.created_at + 8 * 60_000);

        let mut numbers = HashSet::new();
        numbers.insert(order.order_number);
        for _ in 0..20 {
            let next = manager.create_order(request(vec![(6, vec![], 1)])).unwrap();
            assert!(numbers.insert(next.order_number), "duplicate order number");
        }
    }

    #[test]
    fn test_create_order_takes_stock_and_cancel_returns_it() {
        let (manager, _bus) = manager();
        let before = stock_of(&manager, 1);

        let order = manager.create_order(request(vec![(1, vec![], 3)])).unwrap();
        assert_eq!(stock_of(&manager, 1), before - 3);

        let cancelled = manager.cancel_order(&order.id, "お客様都合".into()).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&manager, 1), before);
    }

    #[tokio::test]
    async fn test_repeated_request_id_returns_same_order() {
        let (manager, bus) = manager();
        let mut rx = bus.subscribe();
        let before = stock_of(&manager, 1);

        let mut req = request(vec![(1, vec![], 2)]);
        req.request_id = Some("checkout-1".into());
        let first = manager.create_order(req.clone()).unwrap();
        let version = manager.storage.version().unwrap();

        let again = manager.create_order(req).unwrap();
        assert_eq!(again, first);
        assert_eq!(manager.get_orders(&OrderQuery::default()).unwrap().len(), 1);
        assert_eq!(stock_of(&manager, 1), before - 2);
        // 重复提交不写入也不通知
        assert_eq!(manager.storage.version().unwrap(), version);
        assert_eq!(rx.recv().await.unwrap().action, ChangeAction::Created);
        assert!(rx.try_recv().is_err());

        // 不同的 key 照常下单
        let mut other = request(vec![(1, vec![], 1)]);
        other.request_id = Some("checkout-2".into());
        let second = manager.create_order(other).unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.order_number, "A002");
    }

    #[test]
    fn test_failed_create_leaves_store_untouched() {
        let (manager, _bus) = manager();
        let version = manager.storage.version().unwrap();
        let err = manager
            .create_order(request(vec![(1, vec![], 1), (424242, vec![], 1)]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
        assert_eq!(manager.storage.version().unwrap(), version);
        assert!(manager.get_orders(&OrderQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_status_forward_then_backward_rejected() {
        let (manager, _bus) = manager();
        let order = manager.create_order(request(vec![(2, vec![], 1)])).unwrap();

        let cooking = manager
            .update_order_status(&order.id, OrderStatus::Cooking, None)
            .unwrap();
        assert_eq!(cooking.status, OrderStatus::Cooking);
        assert!(cooking.cooking_started_at.is_some());

        let err = manager
            .update_order_status(&order.id, OrderStatus::Accepted, None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(manager.get_order(&order.id).unwrap().status, OrderStatus::Cooking);
    }

    #[test]
    fn test_skip_to_picked_up_rejected() {
        let (manager, _bus) = manager();
        let order = manager.create_order(request(vec![(2, vec![], 1)])).unwrap();
        let err = manager
            .update_order_status(&order.id, OrderStatus::PickedUp, None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    #[test]
    fn test_lookup_by_number_and_missing() {
        let (manager, _bus) = manager();
        let order = manager.create_order(request(vec![(5, vec![105], 1)])).unwrap();
        let found = manager.get_order_by_number(" a001 ").unwrap();
        assert_eq!(found.id, order.id);

        let err = manager.get_order_by_number("Z999").unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        let err = manager.get_order("nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[test]
    fn test_payment_is_orthogonal_to_status() {
        let (manager, _bus) = manager();
        let order = manager.create_order(request(vec![(4, vec![], 2)])).unwrap();

        let paid = manager
            .record_payment(
                &order.id,
                PaymentRequest {
                    payment_method: PaymentMethod::Qr,
                    amount: 600.0,
                },
            )
            .unwrap();
        assert!(paid.is_paid());
        assert_eq!(paid.status, OrderStatus::Accepted);

        let unpaid = manager
            .get_orders(&OrderQuery {
                status: None,
                payment_status: Some(PaymentStatus::Unpaid),
            })
            .unwrap();
        assert!(unpaid.is_empty());
    }

    #[test]
    fn test_ready_board_and_summary() {
        let (manager, _bus) = manager();
        let a = manager.create_order(request(vec![(1, vec![], 1)])).unwrap();
        let b = manager.create_order(request(vec![(2, vec![], 1)])).unwrap();
        let c = manager.create_order(request(vec![(3, vec![], 1)])).unwrap();

        for id in [&a.id, &b.id] {
            manager.update_order_status(id, OrderStatus::Cooking, None).unwrap();
            manager.update_order_status(id, OrderStatus::Ready, None).unwrap();
        }
        manager.cancel_order(&c.id, "間違い".into()).unwrap();
        manager
            .record_payment(
                &a.id,
                PaymentRequest {
                    payment_method: PaymentMethod::Cash,
                    amount: 1000.0,
                },
            )
            .unwrap();

        let now = now_millis();
        let board = manager.ready_board(now + 11 * 60 * 1000).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].id, a.id);
        assert!(board.iter().all(|r| r.freshness == shared::order::Freshness::Urgent));
        assert!(board[0].is_paid);

        let summary = manager.summary().unwrap();
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.by_status.ready, 2);
        assert_eq!(summary.by_status.cancelled, 1);
        assert_eq!(summary.unpaid, 1);
        assert_eq!(summary.revenue, 600.0);
    }

    #[test]
    fn test_purge_frees_order_numbers() {
        let (manager, _bus) = manager();
        let done = manager.create_order(request(vec![(6, vec![], 1)])).unwrap();
        let open = manager.create_order(request(vec![(6, vec![], 1)])).unwrap();
        manager.cancel_order(&done.id, "test".into()).unwrap();

        assert_eq!(manager.purge_terminal_orders(Some(0)).unwrap(), 0);
        assert_eq!(manager.purge_terminal_orders(None).unwrap(), 1);

        let remaining = manager.get_orders(&OrderQuery::default()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, open.id);
    }

    #[test]
    fn test_update_order_patch() {
        let (manager, _bus) = manager();
        let order = manager.create_order(request(vec![(1, vec![], 1)])).unwrap();
        let updated = manager
            .update_order(
                &order.id,
                OrderPatch {
                    special_instructions: Some("ソース少なめ".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.special_instructions.as_deref(), Some("ソース少なめ"));
        assert_eq!(updated.status, OrderStatus::Accepted);
    }

    #[tokio::test]
    async fn test_mutations_publish_notices() {
        let (manager, bus) = manager();
        let mut rx = bus.subscribe();

        let order = manager.create_order(request(vec![(1, vec![], 1)])).unwrap();
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.resource, Resource::Order);
        assert_eq!(notice.action, ChangeAction::Created);
        assert_eq!(notice.id.as_deref(), Some(order.id.as_str()));

        manager
            .update_order_status(&order.id, OrderStatus::Cooking, None)
            .unwrap();
        let next = rx.recv().await.unwrap();
        assert_eq!(next.action, ChangeAction::StatusChanged);
        assert_eq!(next.version, notice.version + 1);

        // Rejected writes publish nothing
        let _ = manager.update_order_status(&order.id, OrderStatus::Accepted, None);
        assert!(rx.try_recv().is_err());
    }
}

//! Order types
//!
//! Orders carry frozen item snapshots: product and topping names/prices are
//! copied at submission so later catalog edits never reprice history.

use super::freshness::Freshness;
use super::status::{OrderStatus, PaymentMethod, PaymentStatus, Station};
use serde::{Deserialize, Serialize};

/// Topping snapshot inside an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTopping {
    pub topping_id: i64,
    pub name: String,
    pub price: f64,
}

/// Order line snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub toppings: Vec<OrderTopping>,
    pub quantity: u32,
    /// `(unit_price + Σ topping prices) × quantity`
    pub line_total: f64,
}

/// Order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Short code printed on the pickup ticket (e.g. `A042`)
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub estimated_pickup_at: i64,
    #[serde(default)]
    pub cooking_started_at: Option<i64>,
    #[serde(default)]
    pub ready_at: Option<i64>,
    #[serde(default)]
    pub picked_up_at: Option<i64>,
    #[serde(default)]
    pub cancelled_at: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<i64>,
    /// Client idempotency key of the checkout that created this order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Total item count (sum of quantities)
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Station that acts on this order next
    pub fn next_station(&self) -> Option<Station> {
        self.status.next().map(OrderStatus::station)
    }

    /// Milliseconds spent on the pickup shelf, `None` unless ready
    pub fn waiting_millis(&self, now: i64) -> Option<i64> {
        match (self.status, self.ready_at) {
            (OrderStatus::Ready, Some(ready_at)) => Some((now - ready_at).max(0)),
            _ => None,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One requested line; prices are resolved server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    #[serde(default)]
    pub topping_ids: Vec<i64>,
    pub quantity: u32,
}

/// `POST /api/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    /// Idempotency key; resubmitting the same key returns the existing order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Partial order update (`PATCH /api/orders/{id}`)
///
/// A `status` here goes through the same transition rules as the status
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_pickup_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self == &OrderPatch::default()
    }
}

/// `PATCH /api/orders/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    /// Required when `status` is `cancelled`
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/orders/{id}/cancel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

/// `POST /api/orders/{id}/payment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
    pub amount: f64,
}

/// `GET /api/orders` filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.payment_status.is_none_or(|p| p == order.payment_status)
    }
}

/// `DELETE /api/orders/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurgeQuery {
    /// Purge terminal orders last updated before this instant (millis);
    /// all terminal orders when absent
    pub before: Option<i64>,
}

// ============================================================================
// Views
// ============================================================================

/// Entry on the pickup board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyOrder {
    pub id: String,
    pub order_number: String,
    pub ready_at: i64,
    pub waiting_secs: i64,
    pub freshness: Freshness,
    pub is_paid: bool,
}

/// Per-status counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub accepted: usize,
    pub cooking: usize,
    pub ready: usize,
    pub picked_up: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn bump(&mut self, status: OrderStatus) {
        let slot = match status {
            OrderStatus::Accepted => &mut self.accepted,
            OrderStatus::Cooking => &mut self.cooking,
            OrderStatus::Ready => &mut self.ready,
            OrderStatus::PickedUp => &mut self.picked_up,
            OrderStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }

    /// Orders still in the kitchen or on the shelf
    pub fn active(&self) -> usize {
        self.accepted + self.cooking + self.ready
    }
}

/// Store monitor snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_orders: usize,
    pub by_status: StatusCounts,
    /// Non-cancelled orders not yet paid
    pub unpaid: usize,
    /// Paid amount over non-cancelled orders
    pub revenue: f64,
    /// Products at or below their low-stock threshold
    pub low_stock_product_ids: Vec<i64>,
    pub generated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "o-1".into(),
            order_number: "A001".into(),
            items: vec![OrderItem {
                product_id: 1,
                product_name: "焼きそば".into(),
                unit_price: 600.0,
                toppings: vec![],
                quantity: 2,
                line_total: 1200.0,
            }],
            total_amount: 1200.0,
            status,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            paid_amount: 0.0,
            special_instructions: None,
            cancellation_reason: None,
            created_at: 0,
            updated_at: 0,
            estimated_pickup_at: 600_000,
            cooking_started_at: None,
            ready_at: None,
            picked_up_at: None,
            cancelled_at: None,
            paid_at: None,
            request_id: None,
        }
    }

    #[test]
    fn test_query_filters() {
        let o = order(OrderStatus::Cooking);
        assert!(OrderQuery::default().matches(&o));
        assert!(OrderQuery { status: Some(OrderStatus::Cooking), payment_status: None }.matches(&o));
        assert!(!OrderQuery { status: Some(OrderStatus::Ready), payment_status: None }.matches(&o));
        assert!(
            !OrderQuery { status: None, payment_status: Some(PaymentStatus::Paid) }.matches(&o)
        );
    }

    #[test]
    fn test_waiting_only_when_ready() {
        let mut o = order(OrderStatus::Cooking);
        o.ready_at = Some(1_000);
        assert_eq!(o.waiting_millis(5_000), None);
        o.status = OrderStatus::Ready;
        assert_eq!(o.waiting_millis(5_000), Some(4_000));
        assert_eq!(o.waiting_millis(0), Some(0));
    }

    #[test]
    fn test_next_station() {
        assert_eq!(order(OrderStatus::Accepted).next_station(), Some(Station::Kitchen));
        assert_eq!(order(OrderStatus::Ready).next_station(), Some(Station::Delivery));
        assert_eq!(order(OrderStatus::Cancelled).next_station(), None);
        assert_eq!(order(OrderStatus::Accepted).item_count(), 2);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(OrderPatch::default().is_empty());
        let patch: OrderPatch = serde_json::from_str(r#"{"special_instructions":"辛さ控えめ"}"#).unwrap();
        assert!(!patch.is_empty());
    }
}

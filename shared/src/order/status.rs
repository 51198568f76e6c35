//! Order lifecycle
//!
//! ```text
//! accepted ──▶ cooking ──▶ ready ──▶ picked_up
//!    │            │          │
//!    └────────────┴──────────┴──────▶ cancelled
//! ```
//!
//! `picked_up` and `cancelled` are terminal. Payment is tracked separately
//! by [`PaymentStatus`] and never moves the lifecycle.

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
///
/// Wire form is the snake_case English name. The Japanese labels shown on the
/// stall dashboards are accepted as input aliases only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[serde(alias = "受付済み", alias = "受付")]
    Accepted,
    #[serde(alias = "調理中")]
    Cooking,
    #[serde(alias = "準備完了", alias = "受取待ち")]
    Ready,
    #[serde(alias = "受取済み", alias = "受取完了", alias = "completed")]
    PickedUp,
    #[serde(alias = "キャンセル", alias = "canceled")]
    Cancelled,
}

/// Which staff screen drives a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Station {
    Register,
    Kitchen,
    Delivery,
    Any,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Accepted,
        OrderStatus::Cooking,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::Cancelled)
    }

    /// Next state on the happy path
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Accepted => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp | OrderStatus::Cancelled => None,
        }
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == OrderStatus::Cancelled || self.next() == Some(target)
    }

    /// Validate a transition request
    pub fn check_transition(self, target: OrderStatus) -> AppResult<()> {
        if self.can_transition_to(target) {
            return Ok(());
        }
        let code = match self {
            OrderStatus::PickedUp => ErrorCode::OrderAlreadyCompleted,
            OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
            _ => ErrorCode::InvalidStatusTransition,
        };
        Err(AppError::with_message(
            code,
            format!("Cannot move order from {} to {}", self, target),
        )
        .with_detail("from", self.as_str())
        .with_detail("to", target.as_str()))
    }

    /// Screen that performs the transition into this state
    pub fn station(self) -> Station {
        match self {
            OrderStatus::Accepted => Station::Register,
            OrderStatus::Cooking | OrderStatus::Ready => Station::Kitchen,
            OrderStatus::PickedUp => Station::Delivery,
            OrderStatus::Cancelled => Station::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Accepted => "accepted",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Dashboard label
    pub fn label_ja(self) -> &'static str {
        match self {
            OrderStatus::Accepted => "受付済み",
            OrderStatus::Cooking => "調理中",
            OrderStatus::Ready => "準備完了",
            OrderStatus::PickedUp => "受取済み",
            OrderStatus::Cancelled => "キャンセル",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string()))
            .map_err(|_| AppError::validation(format!("Unknown order status: {}", s)))
    }
}

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    #[serde(alias = "未払い", alias = "pending")]
    Unpaid,
    #[serde(alias = "支払済み", alias = "支払い済み")]
    Paid,
}

impl PaymentStatus {
    pub fn label_ja(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "未払い",
            PaymentStatus::Paid => "支払済み",
        }
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "現金")]
    Cash,
    #[serde(alias = "クレジットカード", alias = "credit_card")]
    Card,
    /// QR code wallets (PayPay etc.)
    #[serde(alias = "QR決済", alias = "qr_code", alias = "paypay")]
    Qr,
    #[serde(alias = "電子マネー", alias = "e_money")]
    ElectronicMoney,
}

impl PaymentMethod {
    pub fn label_ja(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "現金",
            PaymentMethod::Card => "クレジットカード",
            PaymentMethod::Qr => "QR決済",
            PaymentMethod::ElectronicMoney => "電子マネー",
        }
    }
}

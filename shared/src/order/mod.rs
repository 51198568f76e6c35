//! Order domain
//!
//! - `cart`: client-side cart reducer
//! - `status`: lifecycle state machine, payment status/method
//! - `freshness`: pickup-shelf timer levels
//! - `money`: decimal-backed price arithmetic
//! - `types`: order record, requests and dashboard views

pub mod cart;
pub mod freshness;
pub mod money;
pub mod status;
pub mod types;

// Re-exports
pub use cart::{Cart, CartAction, CartItem};
pub use freshness::{Freshness, FreshnessThresholds};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, Station};
pub use types::*;

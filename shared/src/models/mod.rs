//! Data models
//!
//! Catalog types shared between stall-server and its clients (via API).
//! Catalog IDs are `i64` snowflakes; order IDs live in [`crate::order`].

pub mod product;
pub mod stock;
pub mod topping;

// Re-exports
pub use product::*;
pub use stock::*;
pub use topping::*;

//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品管理接口
//! - [`toppings`] - 配料管理接口
//! - [`stock`] - 库存接口
//! - [`orders`] - 订单接口 (下单、状态流转、收款、取餐架)
//! - [`dashboard`] - 店长看板
//! - [`system`] - 数据重置、订阅者列表
//! - [`events`] - 变更推送 (SSE)

pub mod health;
pub mod system;
pub mod events;

// Catalog API
pub mod products;
pub mod toppings;
pub mod stock;

// Order API
pub mod orders;
pub mod dashboard;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

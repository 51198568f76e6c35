//! 订单模块
//!
//! - `manager`: 订单读写入口 (存储事务 + 变更通知)
//! - `builder`: 价格快照、库存扣减、取餐时间估算
//! - `lifecycle`: 状态流转与支付规则
//! - `numbering`: 取餐号分配

pub mod builder;
pub mod lifecycle;
pub mod manager;
pub mod numbering;

pub use manager::{OrderSettings, OrdersManager};

//! 变更通知总线
//!
//! 存储提交后通过 [`MessageBus`] 广播 [`ChangeNotice`]，
//! SSE 端点和进程内订阅者从这里接收。

pub mod bus;

pub use bus::{MessageBus, SubscriberGuard, SubscriberInfo};
pub use shared::message::{ChangeAction, ChangeNotice, Resource};

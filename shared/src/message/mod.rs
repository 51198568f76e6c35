//! 变更通知消息
//!
//! 每次存储写入提交后，服务端向所有订阅者广播一条 [`ChangeNotice`]。
//! 订阅者（看板、SSE 客户端）据此决定是否重新拉取数据。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Product,
    Topping,
    Stock,
    Order,
    /// 整个文档（重置、批量清理）
    Store,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Product => "product",
            Resource::Topping => "topping",
            Resource::Stock => "stock",
            Resource::Order => "order",
            Resource::Store => "store",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Paid,
    Purged,
    Reset,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeAction::Created => "created",
            ChangeAction::Updated => "updated",
            ChangeAction::Deleted => "deleted",
            ChangeAction::StatusChanged => "status_changed",
            ChangeAction::Paid => "paid",
            ChangeAction::Purged => "purged",
            ChangeAction::Reset => "reset",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 变更通知载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub resource: Resource,
    pub action: ChangeAction,
    /// 资源 ID（整文档变更时为空）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 提交后的文档版本号；版本跳跃说明订阅者漏掉了通知
    pub version: u64,
    pub timestamp: i64,
    /// 变更后的资源数据（删除时为空）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ChangeNotice {
    pub fn new(resource: Resource, action: ChangeAction, id: Option<String>, version: u64) -> Self {
        Self {
            resource,
            action,
            id,
            version,
            timestamp: crate::util::now_millis(),
            data: None,
        }
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }

    /// SSE event name, e.g. `order.status_changed`
    pub fn event_name(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}

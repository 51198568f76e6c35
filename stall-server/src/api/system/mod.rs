//! System API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/system/reset | POST | 恢复默认菜单并清空订单 |
//! | /api/system/subscribers | GET | 当前推送订阅者 |

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::message::SubscriberInfo;
use crate::utils::{ApiResponse, AppResult, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/system/reset", post(reset))
        .route("/api/system/subscribers", get(subscribers))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub version: u64,
}

/// POST /api/system/reset
pub async fn reset(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<ResetResponse>>> {
    let version = state.reset_data()?;
    Ok(ok_with_message(ResetResponse { version }, "Store data reset"))
}

/// GET /api/system/subscribers
pub async fn subscribers(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<SubscriberInfo>>>> {
    Ok(crate::utils::ok(state.message_bus.subscribers()))
}

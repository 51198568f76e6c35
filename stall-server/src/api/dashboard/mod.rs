//! Dashboard API 模块 - 店长看板

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};
use shared::order::OrderSummary;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/dashboard/summary", get(summary))
}

/// GET /api/dashboard/summary - 各状态数量、未收款数、营业额
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    Ok(ok(state.orders.summary()?))
}

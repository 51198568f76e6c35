//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppResult, no_content, ok};
use shared::order::{
    CancelRequest, CreateOrderRequest, Order, OrderPatch, OrderQuery, PaymentRequest, PurgeQuery,
    ReadyOrder, StatusUpdateRequest,
};
use shared::util::now_millis;

/// GET /api/orders - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    Ok(ok(state.orders.get_orders(&query)?))
}

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_optional_text(&payload.special_instructions, "special_instructions", MAX_NOTE_LEN)?;
    Ok(ok(state.orders.create_order(payload)?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.get_order(&id)?))
}

/// GET /api/orders/number/:order_number - 取餐号查询
pub async fn get_by_number(
    State(state): State<ServerState>,
    Path(order_number): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.get_order_by_number(&order_number)?))
}

/// PATCH /api/orders/:id - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_optional_text(&patch.special_instructions, "special_instructions", MAX_NOTE_LEN)?;
    validate_optional_text(&patch.cancellation_reason, "cancellation_reason", MAX_NOTE_LEN)?;
    Ok(ok(state.orders.update_order(&id, patch)?))
}

/// PATCH /api/orders/:id/status - 状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    let order = state
        .orders
        .update_order_status(&id, payload.status, payload.reason)?;
    Ok(ok(order))
}

/// POST /api/orders/:id/cancel - 取消订单
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    Ok(ok(state.orders.cancel_order(&id, payload.reason)?))
}

/// POST /api/orders/:id/payment - 收款 (无返回数据)
pub async fn record_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.orders.record_payment(&id, payload)?;
    Ok(no_content())
}

/// GET /api/orders/ready - 取餐架
pub async fn ready_board(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<ReadyOrder>>>> {
    Ok(ok(state.orders.ready_board(now_millis())?))
}

/// DELETE /api/orders/history?before= - 清理已结束订单
pub async fn purge_history(
    State(state): State<ServerState>,
    Query(query): Query<PurgeQuery>,
) -> AppResult<Json<ApiResponse<usize>>> {
    Ok(ok(state.orders.purge_terminal_orders(query.before)?))
}

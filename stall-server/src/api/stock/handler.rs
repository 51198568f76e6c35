use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};
use shared::models::{StockAdjustment, StockInfo};

/// GET /api/stock - 所有库存记录
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<StockInfo>>>> {
    Ok(ok(state.catalog.get_stock()?))
}

/// POST /api/stock/:product_id/adjust - 人工修正库存
pub async fn adjust(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(adjustment): Json<StockAdjustment>,
) -> AppResult<Json<ApiResponse<StockInfo>>> {
    Ok(ok(state.catalog.adjust_stock(product_id, adjustment)?))
}

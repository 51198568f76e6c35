//! Order API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 操作台 |
//! |------|------|------|--------|
//! | /api/orders | GET | 订单列表 (status / payment_status 过滤) | 全部 |
//! | /api/orders | POST | 下单 | 顾客 / 收银 |
//! | /api/orders/ready | GET | 取餐架 (含保温提示) | 出餐 |
//! | /api/orders/history | DELETE | 清理已结束订单 | 店长 |
//! | /api/orders/number/{order_number} | GET | 按取餐号查询 | 出餐 |
//! | /api/orders/{id} | GET / PATCH | 查询 / 部分更新 | 全部 |
//! | /api/orders/{id}/status | PATCH | 状态流转 | 厨房 / 出餐 |
//! | /api/orders/{id}/cancel | POST | 取消 (需原因) | 收银 |
//! | /api/orders/{id}/payment | POST | 收款 | 收银 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/ready", get(handler::ready_board))
        .route("/history", delete(handler::purge_history))
        .route("/number/{order_number}", get(handler::get_by_number))
        .route("/{id}", get(handler::get_by_id).patch(handler::update))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/payment", post(handler::record_payment))
}

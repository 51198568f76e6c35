//! Stock API 模块
//!
//! 库存随下单/取消自动增减，这里只提供查看和人工修正。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{product_id}/adjust", post(handler::adjust))
}

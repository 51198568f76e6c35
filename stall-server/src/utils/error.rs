//! 统一错误处理
//!
//! 错误类型来自 `shared::error`，这里只提供 handler 用的成功响应包装。
//!
//! # 响应结构
//!
//! ```json
//! { "success": true, "code": 0, "message": "Success", "data": { ... } }
//! ```
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::order_not_found(&id))
//!
//! // 返回成功响应
//! Ok(ok(order))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}

/// Successful response without `data`
pub fn no_content() -> Json<ApiResponse<()>> {
    Json(ApiResponse::ok())
}

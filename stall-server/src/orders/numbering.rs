//! 取餐号分配
//!
//! 顺序号 `{prefix}{n:03}`，到 999 后回绕到 1；
//! 仍被存量订单占用的号码会被跳过。

use crate::store::StoreDocument;
use shared::error::{AppError, AppResult, ErrorCode};

pub const MAX_ORDER_NUMBER: u32 = 999;

pub fn format_order_number(prefix: &str, n: u32) -> String {
    format!("{}{:03}", prefix, n)
}

/// Advance the counter in `doc` and return the next free number
pub fn next_order_number(doc: &mut StoreDocument, prefix: &str) -> AppResult<String> {
    for _ in 0..MAX_ORDER_NUMBER {
        let n = doc.order_seq % MAX_ORDER_NUMBER + 1;
        doc.order_seq = n;
        let number = format_order_number(prefix, n);
        if !doc.order_number_in_use(&number) {
            return Ok(number);
        }
    }
    Err(AppError::with_message(
        ErrorCode::OrderNumberExhausted,
        format!("All {} order numbers are in use, purge history", MAX_ORDER_NUMBER),
    ))
}

/// Lookup key: trimmed, ASCII-uppercased
pub fn normalize_order_number(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

//! Input validation helpers
//!
//! Centralized text length limits for free-text fields.
//! Limits are chosen based on:
//! - 58mm pickup ticket printers: about 32 chars per line
//! - Reasonable UX limits for names, notes, reasons

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, topping, category
pub const MAX_NAME_LEN: usize = 100;

/// Special instructions, cancellation reasons, descriptions
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    validate_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_len(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("焼きそば", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("  ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 3 chars, 9 bytes
        assert!(validate_required_text("たこ焼", "name", 3).is_ok());
        assert!(validate_optional_text(&Some("たこ焼き".into()), "note", 3).is_err());
        assert!(validate_optional_text(&None, "note", 3).is_ok());
    }
}

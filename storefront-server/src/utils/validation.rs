//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, inquiry messages, order comments
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: part numbers, OEM codes, phone numbers, brands
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / image references
pub const MAX_URL_LEN: usize = 2048;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field)),
        _ => Ok(()),
    }
}

/// Prices must be finite and non-negative.
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::with_message(
            shared::ErrorCode::ProductInvalidPrice,
            format!("{field} must be a non-negative number"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("Brake pad", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 100 Cyrillic letters are 200 bytes
        let name = "ж".repeat(100);
        assert!(validate_required_text(&name, "name", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn optional_text_and_price() {
        assert!(validate_optional_text(&None, "oem", 5).is_ok());
        assert!(validate_optional_text(&Some("123456".into()), "oem", 5).is_err());
        assert!(validate_price(0.0, "price").is_ok());
        assert_eq!(
            validate_price(-1.0, "price").unwrap_err().code,
            ErrorCode::ProductInvalidPrice
        );
        assert!(validate_price(f64::NAN, "price").is_err());
    }
}

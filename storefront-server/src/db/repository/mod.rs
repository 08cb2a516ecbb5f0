//! Repository Module
//!
//! Free async functions over a `SqlitePool` (or a transaction connection),
//! one file per table.

pub mod category;
pub mod customer;
pub mod inquiry;
pub mod order;
pub mod product;
pub mod user;

use shared::error::{AppError, ErrorCode};
use std::str::FromStr;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database("Database operation failed")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// ── Column codecs ───────────────────────────────────────────────────

/// JSON array column -> list. Missing or malformed values become empty.
pub(crate) fn decode_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub(crate) fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Text enum column with an explicit fallback for missing/unknown values
pub(crate) fn decode_enum<T>(raw: Option<&str>, field: &'static str, id: &dyn std::fmt::Display) -> T
where
    T: FromStr<Err = String> + Default,
{
    match raw {
        None => T::default(),
        Some(value) => value.parse().unwrap_or_else(|e: String| {
            tracing::warn!(field, %id, error = %e, "Unknown stored value, using default");
            T::default()
        }),
    }
}

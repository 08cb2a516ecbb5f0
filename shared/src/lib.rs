//! Shared types for the auto-parts storefront
//!
//! Domain models, unified error codes, the API response envelope and
//! catalog query types used by the server and its clients.

pub mod error;
pub mod models;
pub mod query;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use query::{CatalogPage, PaginatedResponse, SearchRequest, SortOrder};

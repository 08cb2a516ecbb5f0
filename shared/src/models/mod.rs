//! Data models
//!
//! Shared between the storefront server and its API clients.
//! IDs are `i64` snowflakes except operator ids, which come from the
//! identity provider.

pub mod category;
pub mod data_transfer;
pub mod inquiry;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use category::*;
pub use data_transfer::*;
pub use inquiry::*;
pub use order::*;
pub use product::*;
pub use user::*;

//! Storefront catalog: navigation tree, search engine and per-view caches

pub mod cache;
pub mod counts;
pub mod engine;
pub mod normalize;
pub mod sessions;
pub mod tree;

pub use cache::{SearchCache, SearchTicket};
pub use engine::{ProductSource, SearchOutcome};
pub use sessions::CatalogSessions;

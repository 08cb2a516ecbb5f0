//! Catalog import/export API
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /api/admin/import?format=csv\|xlsx&mode=smart\|strict&confirm=true | POST | canImportData |
//! | /api/admin/import/preview?format&mode | POST | canImportData |
//! | /api/admin/export | GET | canExportData |
//!
//! The import body is the raw file. Strict mode deletes products missing
//! from the file and is refused unless `confirm=true`. Import routes run
//! without the request timeout; see [`import_router`].

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

/// Largest accepted upload
pub const MAX_IMPORT_BYTES: usize = 32 * 1024 * 1024;

/// Import and preview. Must be mounted outside the timeout layer: an import
/// runs to completion once started.
pub fn import_router() -> Router<ServerState> {
    Router::new()
        .route("/import", post(handler::import))
        .route("/import/preview", post(handler::preview))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES))
        .layer(middleware::from_fn(require_permission(Permission::ImportData)))
}

pub fn export_router() -> Router<ServerState> {
    Router::new()
        .route("/export", get(handler::export))
        .layer(middleware::from_fn(require_permission(Permission::ExportData)))
}

//! Operator accounts API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/users/register | POST | bearer token |
//! | /api/users/me | GET | bearer token |
//! | /api/admin/users | GET | canManageUsers |
//! | /api/admin/users/{id} | GET, PUT | canManageUsers |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

/// Mounted under `/api/users` behind `require_auth`
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/me", get(handler::me))
}

pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .layer(middleware::from_fn(require_permission(Permission::ManageUsers)))
}

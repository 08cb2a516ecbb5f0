//! Dashboard statistics API

mod handler;

use axum::{Router, middleware, routing::get};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/stats", get(handler::get_statistics))
        .layer(middleware::from_fn(require_permission(Permission::ViewStats)))
}

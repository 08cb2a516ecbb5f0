//! Category administration API
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /api/admin/categories | GET | operator |
//! | /api/admin/categories | POST | canManageCategories |
//! | /api/admin/categories/{id} | GET | operator |
//! | /api/admin/categories/{id} | PUT, DELETE | canManageCategories |
//! | /api/admin/categories/recalculate | POST | canManageCategories |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn admin_router() -> Router<ServerState> {
    let manage = || middleware::from_fn(require_permission(Permission::ManageCategories));

    Router::new()
        .route("/", get(handler::list).merge(post(handler::create).layer(manage())))
        .route("/recalculate", post(handler::recalculate).layer(manage()))
        .route(
            "/{id}",
            get(handler::get_by_id).merge(put(handler::update).merge(delete(handler::delete)).layer(manage())),
        )
}

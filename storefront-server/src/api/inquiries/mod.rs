//! Inquiries API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/inquiries | POST | public |
//! | /api/admin/inquiries | GET | operator |
//! | /api/admin/inquiries/{id} | GET | operator |
//! | /api/admin/inquiries/{id} | PUT, DELETE | canEditProducts |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/inquiries", post(handler::create))
}

pub fn admin_router() -> Router<ServerState> {
    Router::new().route("/", get(handler::list)).route(
        "/{id}",
        get(handler::get_by_id).merge(
            put(handler::update_status)
                .merge(delete(handler::delete))
                .layer(middleware::from_fn(require_permission(Permission::EditProducts))),
        ),
    )
}

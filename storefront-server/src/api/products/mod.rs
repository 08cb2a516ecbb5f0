//! Product administration API
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /api/admin/products | GET | operator |
//! | /api/admin/products | POST | canCreateProducts |
//! | /api/admin/products/{id} | GET | operator |
//! | /api/admin/products/{id} | PUT | canEditProducts |
//! | /api/admin/products/{id} | DELETE | canDeleteProducts |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use shared::models::Permission;

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(handler::list).merge(
                post(handler::create).layer(middleware::from_fn(require_permission(Permission::CreateProducts))),
            ),
        )
        .route(
            "/{id}",
            get(handler::get_by_id)
                .merge(put(handler::update).layer(middleware::from_fn(require_permission(Permission::EditProducts))))
                .merge(
                    delete(handler::delete).layer(middleware::from_fn(require_permission(Permission::DeleteProducts))),
                ),
        )
}

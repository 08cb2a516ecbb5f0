//! Orders API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | public (checkout) |
//! | /api/admin/orders | GET | operator |
//! | /api/admin/orders/{id} | GET | operator |
//! | /api/admin/customers | GET | operator |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/orders", post(handler::checkout))
}

pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
}

pub fn customers_router() -> Router<ServerState> {
    Router::new().route("/", get(handler::list_customers))
}

//! Public catalog API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/catalog/categories | GET | Navigation tree with product counts |
//! | /api/catalog/products | GET | Server-paginated browse |
//! | /api/catalog/products/{id} | GET | Product detail (counts a view) |
//! | /api/catalog/sessions/{sid}/search | POST | Text search, first page |
//! | /api/catalog/sessions/{sid}/more | POST | Next page of the cached search |
//! | /api/catalog/sessions/{sid}/category | PUT | Category filter over cached results |
//! | /api/catalog/sessions/{sid}/sort | PUT | Re-sort cached results |
//! | /api/catalog/sessions/{sid}/status | PUT | Status filter (re-runs the search) |
//! | /api/catalog/sessions/{sid} | DELETE | Drop the session |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/catalog", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/categories", get(handler::category_tree))
        .route("/products", get(handler::browse))
        .route("/products/{id}", get(handler::product_detail))
        .route("/sessions/{sid}", delete(handler::clear_session))
        .route("/sessions/{sid}/search", post(handler::search))
        .route("/sessions/{sid}/more", post(handler::load_more))
        .route("/sessions/{sid}/category", put(handler::set_category))
        .route("/sessions/{sid}/sort", put(handler::set_sort))
        .route("/sessions/{sid}/status", put(handler::set_status))
}

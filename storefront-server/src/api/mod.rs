//! HTTP API
//!
//! # Structure
//!
//! Public storefront:
//! - [`health`] - liveness
//! - [`catalog`] - category tree, product browse/detail, search sessions
//! - [`orders`] - checkout
//! - [`inquiries`] - price/availability inquiries
//! - [`notify`] - forward a notification payload to the staff chat
//!
//! Authenticated:
//! - [`users`] - self registration and profile
//!
//! Back office (`/api/admin`, operator gate + per-route permissions):
//! - [`products`], [`categories`], [`inquiries`], [`orders`] (and customers), [`users`]
//! - [`data_transfer`] - import, preview, export
//! - [`statistics`] - dashboard counters

pub mod catalog;
pub mod categories;
pub mod data_transfer;
pub mod health;
pub mod inquiries;
pub mod middleware;
pub mod notify;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod users;

use axum::Router;
use axum::middleware as axum_middleware;
use http::HeaderName;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_operator};
use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Every route with auth gates and the request timeout, no outer middleware.
///
/// The timeout wraps every route except the import endpoints, which must
/// never be cut off between batches.
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    let timeout = TimeoutLayer::new(state.config.request_timeout());
    let authenticated = users::router().route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .nest("/products", products::admin_router())
        .nest("/categories", categories::admin_router())
        .nest("/inquiries", inquiries::admin_router())
        .nest("/orders", orders::admin_router())
        .nest("/customers", orders::customers_router())
        .nest("/users", users::admin_router())
        .merge(data_transfer::export_router())
        .merge(statistics::admin_router())
        .layer(timeout.clone())
        .merge(data_transfer::import_router())
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_operator));

    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(inquiries::router())
        .merge(notify::router())
        .nest("/api/users", authenticated)
        .layer(timeout)
        .nest("/api/admin", admin)
}

/// Router with the HTTP middleware stack, used by the listener and by tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router(state)
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

//! Checkout and order handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{CartLine, Customer, CustomerContact, Order, OrderCreate, OrderItem};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{customer, order, product};
use crate::notify::NotificationPayload;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// Max distinct lines in one cart
const MAX_CART_LINES: usize = 100;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    /// Whether the staff chat accepted the notification
    pub notified: bool,
}

fn validate_contact(contact: &CustomerContact) -> AppResult<()> {
    validate_required_text(&contact.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&contact.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&contact.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&contact.comment, "comment", MAX_NOTE_LEN)?;
    Ok(())
}

/// Price the cart from current product rows.
///
/// The snapshot is what the order keeps; later product edits do not touch it.
pub async fn snapshot_items(pool: &SqlitePool, lines: &[CartLine]) -> AppResult<Vec<OrderItem>> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if lines.len() > MAX_CART_LINES {
        return Err(AppError::validation(format!("Too many cart lines (max {MAX_CART_LINES})")));
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(AppError::validation("quantity must be at least 1").with_detail("product_id", line.product_id));
        }
        let p = product::find_by_id(pool, line.product_id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", line.product_id))
        })?;
        items.push(OrderItem {
            product_id: p.id,
            name: p.name,
            part_number: p.part_number,
            price: p.price,
            quantity: line.quantity,
        });
    }
    Ok(items)
}

/// POST /api/orders
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    let mut contact = payload.customer;
    contact.name = contact.name.trim().to_string();
    contact.phone = contact.phone.trim().to_string();
    validate_contact(&contact)?;

    let items = snapshot_items(&state.pool, &payload.items).await?;
    let created = order::create(&state.pool, items, contact.clone()).await?;
    customer::record_order(&state.pool, &contact).await?;

    tracing::info!(order_id = created.id, total = created.total, lines = created.items.len(), "Order placed");

    let notified = state
        .notifier
        .notify_best_effort(&NotificationPayload::Order(created.clone()))
        .await;

    Ok((
        StatusCode::CREATED,
        ok(CheckoutResponse {
            order: created,
            notified,
        }),
    ))
}

/// GET /api/admin/orders
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    Ok(ok(order::find_all(&state.pool).await?))
}

/// GET /api/admin/orders/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<ApiResponse<Order>>> {
    let found = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")))?;
    Ok(ok(found))
}

/// GET /api/admin/customers
pub async fn list_customers(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Customer>>>> {
    Ok(ok(customer::find_all(&state.pool).await?))
}

//! Inquiry handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{Inquiry, InquiryCreate, InquiryStatusUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::inquiry::NewInquiry;
use crate::db::repository::{inquiry, product};
use crate::notify::NotificationPayload;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub inquiry: Inquiry,
    pub notified: bool,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::InquiryNotFound, format!("Inquiry {id} not found"))
}

/// POST /api/inquiries
///
/// Bumps the product's inquiry counter when a product is referenced.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InquiryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<InquiryResponse>>)> {
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.message, "message", MAX_NOTE_LEN)?;
    if let Some(price) = payload.proposed_price {
        validate_price(price, "proposed_price")?;
    }

    let product_name = match payload.product_id {
        Some(id) => {
            let p = product::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))?;
            Some(p.name)
        }
        None => None,
    };

    let created = inquiry::create(
        &state.pool,
        NewInquiry {
            product_id: payload.product_id,
            product_name,
            customer_name: payload.customer_name.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            email: payload.email,
            message: payload.message,
            proposed_price: payload.proposed_price,
        },
    )
    .await?;

    if let Some(id) = created.product_id {
        product::increment_inquiries(&state.pool, id).await?;
    }

    tracing::info!(inquiry_id = created.id, product_id = ?created.product_id, "Inquiry received");

    let notified = state
        .notifier
        .notify_best_effort(&NotificationPayload::Inquiry(created.clone()))
        .await;

    Ok((
        StatusCode::CREATED,
        ok(InquiryResponse {
            inquiry: created,
            notified,
        }),
    ))
}

/// GET /api/admin/inquiries
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Inquiry>>>> {
    Ok(ok(inquiry::find_all(&state.pool).await?))
}

/// GET /api/admin/inquiries/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<ApiResponse<Inquiry>>> {
    let found = inquiry::find_by_id(&state.pool, id).await?.ok_or_else(|| not_found(id))?;
    Ok(ok(found))
}

/// PUT /api/admin/inquiries/{id}
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<InquiryStatusUpdate>,
) -> AppResult<Json<ApiResponse<Inquiry>>> {
    if inquiry::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let updated = inquiry::update_status(&state.pool, id, payload.status).await?;
    tracing::info!(inquiry_id = id, status = %updated.status, operator = %user.id, "Inquiry status changed");
    Ok(ok(updated))
}

/// DELETE /api/admin/inquiries/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !inquiry::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(inquiry_id = id, operator = %user.id, "Inquiry deleted");
    Ok(ok(true))
}

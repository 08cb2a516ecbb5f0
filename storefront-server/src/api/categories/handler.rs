//! Category administration handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::catalog::counts::recalculate_category_counts;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

/// Repository errors with category-specific codes
fn map_err(id: Option<i64>, err: RepoError) -> AppError {
    match (err, id) {
        (RepoError::NotFound(_), Some(id)) => not_found(id),
        (RepoError::Validation(msg), _) => AppError::with_message(ErrorCode::CategoryParentInvalid, msg),
        (other, _) => other.into(),
    }
}

/// GET /api/admin/categories
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    Ok(ok(category::find_all(&state.pool).await?))
}

/// GET /api/admin/categories/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<ApiResponse<Category>>> {
    let found = category::find_by_id(&state.pool, id).await?.ok_or_else(|| not_found(id))?;
    Ok(ok(found))
}

/// POST /api/admin/categories
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let created = category::create(&state.pool, payload).await.map_err(|e| map_err(None, e))?;
    tracing::info!(category_id = created.id, name = %created.name, operator = %user.id, "Category created");
    Ok((StatusCode::CREATED, ok(created)))
}

/// PUT /api/admin/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let updated = category::update(&state.pool, id, payload).await.map_err(|e| map_err(Some(id), e))?;
    tracing::info!(category_id = id, operator = %user.id, "Category updated");
    Ok(ok(updated))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// The category plus every descendant
    pub deleted: usize,
}

/// DELETE /api/admin/categories/{id}
///
/// Removes the whole subtree. Products keep their (now dangling) category ids.
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DeleteResponse>>> {
    let deleted = category::delete(&state.pool, id).await.map_err(|e| map_err(Some(id), e))?;
    audit_log!(user.id.as_str(), "delete_category", "categories", format!("{id} (+{} descendants)", deleted.saturating_sub(1)));
    Ok(ok(DeleteResponse { deleted }))
}

/// POST /api/admin/categories/recalculate
///
/// Rewrites every stored `product_count` from a full product scan.
pub async fn recalculate(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<BTreeMap<i64, usize>>>> {
    let counts = recalculate_category_counts(&state.pool).await?;
    tracing::info!(categories = counts.len(), operator = %user.id, "Category counts recalculated on request");
    Ok(ok(counts.into_iter().collect()))
}

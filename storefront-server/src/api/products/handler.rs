//! Product administration handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Product, ProductCreate, ProductStatus, ProductUpdate};
use shared::query::{PaginatedResponse, SortOrder};
use serde::Deserialize;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::catalog::counts::recalculate_category_counts;
use crate::core::ServerState;
use crate::db::repository::product::{self, BrowseQuery};
use crate::db::repository::RepoError;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const ADMIN_PAGE_LIMIT: u32 = 500;

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

fn validate_images(images: &[String]) -> AppResult<()> {
    for url in images {
        validate_required_text(url, "images", MAX_URL_LEN)?;
    }
    Ok(())
}

fn validate_create(data: &ProductCreate) -> AppResult<()> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.part_number, "part_number", MAX_SHORT_TEXT_LEN)?;
    validate_price(data.price, "price")?;
    if let Some(v) = data.original_price {
        validate_price(v, "original_price")?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.brand, "brand", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.oem, "oem", MAX_SHORT_TEXT_LEN)?;
    validate_images(&data.images)
}

fn validate_update(data: &ProductUpdate) -> AppResult<()> {
    if let Some(v) = &data.name {
        validate_required_text(v, "name", MAX_NAME_LEN)?;
    }
    if let Some(v) = &data.part_number {
        validate_required_text(v, "part_number", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(v) = data.price {
        validate_price(v, "price")?;
    }
    if let Some(v) = data.original_price {
        validate_price(v, "original_price")?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.brand, "brand", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.oem, "oem", MAX_SHORT_TEXT_LEN)?;
    if let Some(images) = &data.images {
        validate_images(images)?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/admin/products
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Product>>>> {
    let query = BrowseQuery {
        category_id: params.category_id,
        status: params.status,
        sort: params.sort.unwrap_or_default(),
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(50).clamp(1, ADMIN_PAGE_LIMIT),
    };
    let (items, total) = product::find_page(&state.pool, &query).await?;
    Ok(ok(PaginatedResponse::new(items, total, query.page, query.limit)))
}

/// GET /api/admin/products/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<ApiResponse<Product>>> {
    let found = product::find_by_id(&state.pool, id).await?.ok_or_else(|| not_found(id))?;
    Ok(ok(found))
}

/// POST /api/admin/products
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    validate_create(&payload)?;

    let created = product::create(&state.pool, payload, Some(&user.id)).await?;
    if created.effective_category_id().is_some() {
        recalculate_category_counts(&state.pool).await?;
    }
    tracing::info!(product_id = created.id, part_number = %created.part_number, operator = %user.id, "Product created");
    Ok((StatusCode::CREATED, ok(created)))
}

/// PUT /api/admin/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_update(&payload)?;
    let moves_category = payload.category_id.is_some() || payload.subcategory_id.is_some();

    let updated = product::update(&state.pool, id, payload, Some(&user.id))
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    if moves_category {
        recalculate_category_counts(&state.pool).await?;
    }
    tracing::info!(product_id = id, operator = %user.id, "Product updated");
    Ok(ok(updated))
}

/// DELETE /api/admin/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !product::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    recalculate_category_counts(&state.pool).await?;
    audit_log!(user.id.as_str(), "delete_product", "products", id);
    Ok(ok(true))
}

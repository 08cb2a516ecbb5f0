//! Public catalog handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{CategoryNodeWithCount, Product, ProductStatus};
use shared::query::{CatalogPage, PaginatedResponse, SortOrder};

use crate::catalog::counts::effective_counts;
use crate::catalog::tree::{annotate_counts, build_tree};
use crate::core::ServerState;
use crate::db::repository::product::BrowseQuery;
use crate::db::repository::{category, product};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const MAX_PAGE_LIMIT: u32 = 100;

/// GET /api/catalog/categories
///
/// Counts are computed from the live product table by effective category.
pub async fn category_tree(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<CategoryNodeWithCount>>>> {
    let (categories, products) = tokio::try_join!(category::find_all(&state.pool), product::find_all(&state.pool))?;
    let tree = build_tree(&categories);
    Ok(ok(annotate_counts(&tree, &effective_counts(&products))))
}

#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    pub category_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/catalog/products
pub async fn browse(
    State(state): State<ServerState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Product>>>> {
    let default_limit = u32::try_from(state.config.catalog_page_size).unwrap_or(MAX_PAGE_LIMIT);
    let query = BrowseQuery {
        category_id: params.category_id,
        status: params.status,
        sort: params.sort.unwrap_or_default(),
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
    };
    let (items, total) = product::find_page(&state.pool, &query).await?;
    Ok(ok(PaginatedResponse::new(items, total, query.page, query.limit)))
}

/// GET /api/catalog/products/{id}
pub async fn product_detail(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<ApiResponse<Product>>> {
    let mut found = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))?;

    product::increment_views(&state.pool, id).await?;
    found.views += 1;
    Ok(ok(found))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub query: String,
}

/// POST /api/catalog/sessions/{sid}/search
pub async fn search(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
    Json(body): Json<SearchBody>,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let page = state.sessions.search(&sid, &state.pool, &body.query).await?;
    tracing::debug!(sid = %sid, query = %body.query, total = page.total_count, "Catalog search");
    Ok(ok(page))
}

/// POST /api/catalog/sessions/{sid}/more
pub async fn load_more(State(state): State<ServerState>, Path(sid): Path<String>) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    Ok(ok(state.sessions.load_more(&sid)?))
}

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub category_id: Option<i64>,
}

/// PUT /api/catalog/sessions/{sid}/category
///
/// `data` is null when the session has no search yet.
pub async fn set_category(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
    Json(body): Json<CategoryBody>,
) -> AppResult<Json<ApiResponse<Option<CatalogPage>>>> {
    Ok(ok(state.sessions.set_category(&sid, body.category_id)?))
}

#[derive(Debug, Deserialize)]
pub struct SortBody {
    pub sort: SortOrder,
}

/// PUT /api/catalog/sessions/{sid}/sort
pub async fn set_sort(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
    Json(body): Json<SortBody>,
) -> AppResult<Json<ApiResponse<Option<CatalogPage>>>> {
    Ok(ok(state.sessions.set_sort(&sid, body.sort)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Option<ProductStatus>,
}

/// PUT /api/catalog/sessions/{sid}/status
pub async fn set_status(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
    Json(body): Json<StatusBody>,
) -> AppResult<Json<ApiResponse<Option<CatalogPage>>>> {
    Ok(ok(state.sessions.set_status(&sid, &state.pool, body.status).await?))
}

/// DELETE /api/catalog/sessions/{sid}
pub async fn clear_session(State(state): State<ServerState>, Path(sid): Path<String>) -> Json<ApiResponse<bool>> {
    ok(state.sessions.clear(&sid))
}

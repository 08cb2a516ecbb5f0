//! Statistics handlers

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Serialize;
use shared::models::{InquiryStatus, Product};

use crate::core::ServerState;
use crate::db::repository::{inquiry, order, product};
use crate::utils::{ApiResponse, AppResult, ok};

const MOST_VIEWED_LIMIT: u32 = 5;

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub products: i64,
    /// Status name -> product count
    pub products_by_status: BTreeMap<String, i64>,
    pub new_inquiries: i64,
    pub orders: i64,
    pub revenue: f64,
    pub most_viewed: Vec<Product>,
}

/// GET /api/admin/stats
pub async fn get_statistics(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<StoreStats>>> {
    let pool = &state.pool;
    let (products, by_status, new_inquiries, orders, revenue, most_viewed) = tokio::try_join!(
        product::count(pool),
        product::count_by_status(pool),
        inquiry::count_by_status(pool, InquiryStatus::New),
        order::count(pool),
        order::revenue(pool),
        product::find_most_viewed(pool, MOST_VIEWED_LIMIT),
    )?;

    Ok(ok(StoreStats {
        products,
        products_by_status: by_status.into_iter().collect(),
        new_inquiries,
        orders,
        revenue,
        most_viewed,
    }))
}

//! Import/export handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use shared::models::{ImportFormat, ImportMode, ImportPreview, ImportReport};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::data_transfer::{ImportOptions, export_csv, import_products, parse_rows, preview_import};
use crate::db::repository::product;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    pub format: Option<String>,
    pub mode: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

impl ImportParams {
    fn format(&self) -> AppResult<ImportFormat> {
        match self.format.as_deref() {
            None => Ok(ImportFormat::Csv),
            Some(raw) => raw
                .parse()
                .map_err(|e: String| AppError::with_message(ErrorCode::ImportUnsupportedFormat, e)),
        }
    }

    fn mode(&self) -> AppResult<ImportMode> {
        match self.mode.as_deref() {
            None => Ok(ImportMode::Smart),
            Some(raw) => raw.parse().map_err(|e: String| AppError::validation(e)),
        }
    }
}

/// POST /api/admin/import
pub async fn import(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ImportReport>>> {
    let format = params.format()?;
    let mode = params.mode()?;
    if mode == ImportMode::Strict && !params.confirm {
        return Err(AppError::with_message(
            ErrorCode::ImportConfirmationRequired,
            "Strict import deletes products missing from the file; repeat with confirm=true",
        ));
    }

    let rows = parse_rows(format, &body)?;
    tracing::info!(operator = %user.id, %mode, rows = rows.len(), bytes = body.len(), "Product import started");
    if mode == ImportMode::Strict {
        audit_log!(user.id.as_str(), "strict_import_confirmed", "products", rows.len());
    }

    let options = ImportOptions {
        mode,
        batch_size: state.config.import_batch_size,
        operator: Some(user.id.clone()),
    };
    // detached so a dropped connection cannot stop the import between batches
    let pool = state.pool.clone();
    let report = tokio::spawn(async move { import_products(&pool, &rows, &options).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Import task did not complete");
            AppError::new(ErrorCode::InternalError)
        })??;
    Ok(ok(report))
}

/// POST /api/admin/import/preview
pub async fn preview(
    State(state): State<ServerState>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ImportPreview>>> {
    let rows = parse_rows(params.format()?, &body)?;
    Ok(ok(preview_import(&state.pool, &rows, params.mode()?).await?))
}

/// GET /api/admin/export
pub async fn export(State(state): State<ServerState>, user: CurrentUser) -> AppResult<impl IntoResponse> {
    let products = product::find_all(&state.pool).await?;
    let csv = export_csv(&products)?;
    let filename = format!("products-{}.csv", chrono::Utc::now().format("%Y-%m-%d"));
    tracing::info!(operator = %user.id, products = products.len(), "Catalog exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        csv,
    ))
}

//! Product import reconciliation
//!
//! Rows are matched to stored products by part number (oldest product wins
//! when several share one). Writes are queued and committed in transactions
//! of at most [`MAX_BATCH_SIZE`] operations; a failed row or batch never
//! aborts the import.

use super::rows::{ParsedRow, ProductImportRow, cell, parse_number, split_list};
use crate::audit_log;
use crate::catalog::counts::recalculate_category_counts;
use crate::db::repository::{RepoResult, product};
use crate::utils::slug::product_slug;
use shared::error::{AppError, AppResult};
use shared::models::{
    DeletionCandidate, ImportMode, ImportPreview, ImportReport, Product, ProductCondition, ProductStatus, RowError,
    SeoMeta,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

/// Store-imposed ceiling on operations per atomic batch
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Clamped to `1..=MAX_BATCH_SIZE`
    pub batch_size: usize,
    /// Recorded as `updated_by`
    pub operator: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Smart,
            batch_size: MAX_BATCH_SIZE,
            operator: None,
        }
    }
}

/// Discount badge rule for a price coming from an import row.
///
/// New product: the row's own value. Existing product: a price rise clears
/// the badge, a price drop shows the old price, an unchanged price keeps the
/// row's value or else the stored one.
pub fn derive_original_price(new_price: f64, row_original: Option<f64>, existing: Option<&Product>) -> Option<f64> {
    match existing {
        None => row_original,
        Some(old) if new_price > old.price => None,
        Some(old) if new_price < old.price => Some(old.price),
        Some(old) => row_original.or(old.original_price),
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    cell(value).map(str::to_string)
}

fn optional_number(value: &Option<String>, column: &str) -> Result<Option<f64>, String> {
    cell(value)
        .map(|raw| parse_number(raw).map_err(|e| format!("{column}: {e}")))
        .transpose()
}

fn optional_id(value: &Option<String>, column: &str) -> Result<Option<i64>, String> {
    cell(value)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| format!("{column}: '{raw}' is not a valid id"))
        })
        .transpose()
}

fn optional_enum<T>(value: &Option<String>, column: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr<Err = String>,
{
    cell(value)
        .map(|raw| raw.parse::<T>().map_err(|e| format!("{column}: {e}")))
        .transpose()
}

/// Build the product a row describes.
///
/// Missing optional cells become `None` even when the stored product had a
/// value. Images, counters and `created_at` come from `existing`.
pub fn build_product(row: &ProductImportRow, existing: Option<&Product>, operator: Option<&str>) -> Result<Product, String> {
    let name = cell(&row.name).ok_or("Missing name")?.to_string();
    let price = parse_number(cell(&row.price).ok_or("Missing price")?).map_err(|e| format!("price: {e}"))?;
    if price < 0.0 {
        return Err("price: must not be negative".into());
    }
    let row_original = optional_number(&row.original_price, "originalPrice")?;
    let category_id = optional_id(&row.category_id, "categoryId")?;
    let subcategory_id = optional_id(&row.subcategory_id, "subcategoryId")?;
    let status: Option<ProductStatus> = optional_enum(&row.status, "status")?;
    let condition: Option<ProductCondition> = optional_enum(&row.condition, "condition")?;
    let year = cell(&row.year)
        .map(|raw| raw.parse::<i32>().map_err(|_| format!("year: '{raw}' is not a year")))
        .transpose()?;

    let part_number = row.part_number().unwrap_or_default().to_string();
    let slug = optional_text(&row.slug).unwrap_or_else(|| product_slug(&name, &part_number));
    let now = shared::util::datetime_from_millis(Some(now_millis()));

    Ok(Product {
        id: existing.map_or_else(snowflake_id, |p| p.id),
        original_price: derive_original_price(price, row_original, existing),
        description: optional_text(&row.description),
        price,
        category_id,
        subcategory_id,
        status: status.unwrap_or_default(),
        condition: condition.unwrap_or_default(),
        brand: optional_text(&row.brand),
        oem: optional_text(&row.oem),
        compatibility: split_list(cell(&row.compatibility)),
        year,
        car_brand: optional_text(&row.car_brand),
        car_model: optional_text(&row.car_model),
        images: existing.map(|p| p.images.clone()).unwrap_or_default(),
        seo: SeoMeta {
            title: optional_text(&row.meta_title),
            description: optional_text(&row.meta_description),
            keywords: split_list(cell(&row.meta_keywords)),
            slug: Some(slug),
        },
        views: existing.map_or(0, |p| p.views),
        inquiries: existing.map_or(0, |p| p.inquiries),
        created_at: existing.map_or(now, |p| p.created_at),
        updated_at: now,
        updated_by: operator.map(str::to_string),
        name,
        part_number,
    })
}

/// Part number -> canonical (oldest) stored product
fn index_by_part_number(products: Vec<Product>) -> HashMap<String, Product> {
    let mut index: HashMap<String, Product> = HashMap::new();
    for p in products.into_iter().filter(|p| !p.part_number.is_empty()) {
        match index.get(&p.part_number) {
            Some(current) if (current.created_at, current.id) <= (p.created_at, p.id) => {}
            _ => {
                index.insert(p.part_number.clone(), p);
            }
        }
    }
    index
}

/// Part numbers named anywhere in the file, valid rows or not
fn input_part_numbers(rows: &[ParsedRow]) -> HashSet<String> {
    rows.iter()
        .filter_map(|r| r.data.part_number())
        .map(str::to_string)
        .collect()
}

/// Stored products a strict import would delete
fn deletion_candidates(stored: &[Product], keep: &HashSet<String>) -> Vec<DeletionCandidate> {
    stored
        .iter()
        .filter(|p| !p.part_number.is_empty() && !keep.contains(&p.part_number))
        .map(|p| DeletionCandidate {
            id: p.id,
            part_number: p.part_number.clone(),
            name: p.name.clone(),
        })
        .collect()
}

enum Op {
    Create(Product),
    Update(Product),
}

struct Pending {
    row: usize,
    op: Op,
    /// Index entry this row displaced, put back if the batch fails
    replaced: Option<Product>,
}

async fn commit_batch(pool: &SqlitePool, batch: &[Pending]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    for pending in batch {
        match &pending.op {
            Op::Create(p) => product::insert(&mut *tx, p).await?,
            Op::Update(p) => product::replace(&mut *tx, p).await?,
        }
    }
    tx.commit().await?;
    Ok(())
}

/// Commit one batch and fold the outcome into the report
async fn flush(
    pool: &SqlitePool,
    batch: &mut Vec<Pending>,
    index: &mut HashMap<String, Product>,
    report: &mut ImportReport,
) {
    if batch.is_empty() {
        return;
    }
    match commit_batch(pool, batch).await {
        Ok(()) => {
            for pending in batch.iter() {
                match pending.op {
                    Op::Create(_) => report.success += 1,
                    Op::Update(_) => report.updated += 1,
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, rows = batch.len(), "Import batch failed to commit");
            // newest first, so repeated part numbers unwind to the stored state
            for pending in batch.iter().rev() {
                let (Op::Create(p) | Op::Update(p)) = &pending.op;
                match &pending.replaced {
                    Some(previous) => {
                        index.insert(p.part_number.clone(), previous.clone());
                    }
                    None => {
                        index.remove(&p.part_number);
                    }
                }
            }
            for pending in batch.iter() {
                report.failed += 1;
                report.errors.push(RowError {
                    row: pending.row,
                    message: format!("Batch write failed: {e}"),
                });
            }
        }
    }
    batch.clear();
}

/// Reconcile parsed rows against the store.
///
/// Strict mode also deletes every stored product whose non-empty part number
/// does not appear in the file. Category counts are recomputed afterwards.
pub async fn import_products(pool: &SqlitePool, rows: &[ParsedRow], options: &ImportOptions) -> AppResult<ImportReport> {
    let batch_size = options.batch_size.clamp(1, MAX_BATCH_SIZE);
    let operator = options.operator.as_deref();

    let mut index = index_by_part_number(product::find_all(pool).await?);
    let mut report = ImportReport::default();
    let mut batch: Vec<Pending> = Vec::with_capacity(batch_size);

    for parsed in rows {
        if let Some(message) = &parsed.error {
            report.failed += 1;
            report.errors.push(RowError {
                row: parsed.row,
                message: message.clone(),
            });
            continue;
        }
        let existing = parsed.data.part_number().and_then(|pn| index.get(pn));
        let built = match build_product(&parsed.data, existing, operator) {
            Ok(p) => p,
            Err(message) => {
                tracing::debug!(row = parsed.row, %message, "Import row rejected");
                report.failed += 1;
                report.errors.push(RowError { row: parsed.row, message });
                continue;
            }
        };

        let replaced = existing.cloned();
        let op = if replaced.is_some() { Op::Update(built.clone()) } else { Op::Create(built.clone()) };
        if !built.part_number.is_empty() {
            index.insert(built.part_number.clone(), built);
        }
        batch.push(Pending {
            row: parsed.row,
            op,
            replaced,
        });

        if batch.len() >= batch_size {
            flush(pool, &mut batch, &mut index, &mut report).await;
        }
    }
    flush(pool, &mut batch, &mut index, &mut report).await;

    if options.mode == ImportMode::Strict {
        let deleted = delete_absent(pool, &input_part_numbers(rows), batch_size).await?;
        report.deleted = Some(deleted);
        audit_log!(operator.unwrap_or("unknown"), "strict_import_delete", "products", deleted);
    }

    recalculate_category_counts(pool).await.map_err(AppError::from)?;

    tracing::info!(
        mode = %options.mode,
        rows = rows.len(),
        created = report.success,
        updated = report.updated,
        failed = report.failed,
        deleted = ?report.deleted,
        "Product import finished"
    );
    Ok(report)
}

async fn delete_absent(pool: &SqlitePool, keep: &HashSet<String>, batch_size: usize) -> AppResult<usize> {
    let stored = product::find_all(pool).await?;
    let doomed = deletion_candidates(&stored, keep);

    let mut deleted = 0;
    for chunk in doomed.chunks(batch_size) {
        match delete_batch(pool, chunk).await {
            Ok(n) => deleted += n,
            Err(e) => tracing::error!(error = %e, products = chunk.len(), "Strict import deletion batch failed"),
        }
    }
    Ok(deleted)
}

async fn delete_batch(pool: &SqlitePool, chunk: &[DeletionCandidate]) -> RepoResult<usize> {
    let mut tx = pool.begin().await?;
    let mut n = 0;
    for c in chunk {
        if product::delete_with(&mut *tx, c.id).await? {
            n += 1;
        }
    }
    tx.commit().await?;
    Ok(n)
}

/// Dry run: what an import of these rows would do, without writing
pub async fn preview_import(pool: &SqlitePool, rows: &[ParsedRow], mode: ImportMode) -> AppResult<ImportPreview> {
    let stored = product::find_all(pool).await?;
    let mut known: HashSet<String> = stored
        .iter()
        .filter(|p| !p.part_number.is_empty())
        .map(|p| p.part_number.clone())
        .collect();
    let by_part = index_by_part_number(stored.clone());

    let mut preview = ImportPreview {
        rows: rows.len(),
        ..Default::default()
    };
    for parsed in rows {
        let pn = parsed.data.part_number();
        let existing = pn.and_then(|pn| by_part.get(pn));
        if parsed.error.is_some() || build_product(&parsed.data, existing, None).is_err() {
            preview.invalid += 1;
            continue;
        }
        match pn {
            Some(pn) if known.contains(pn) => preview.to_update += 1,
            Some(pn) => {
                known.insert(pn.to_string());
                preview.to_create += 1;
            }
            None => preview.to_create += 1,
        }
    }

    if mode == ImportMode::Strict {
        preview.to_delete = deletion_candidates(&stored, &input_part_numbers(rows));
    }
    Ok(preview)
}

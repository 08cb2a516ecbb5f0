//! Inquiry Repository

use super::{RepoError, RepoResult, decode_enum};
use shared::models::{Inquiry, InquiryStatus};
use shared::util::{datetime_from_millis, now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, product_id, product_name, customer_name, phone, email, message, proposed_price, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: i64,
    product_id: Option<i64>,
    product_name: Option<String>,
    customer_name: String,
    phone: String,
    email: Option<String>,
    message: Option<String>,
    proposed_price: Option<f64>,
    status: Option<String>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl From<InquiryRow> for Inquiry {
    fn from(row: InquiryRow) -> Self {
        let created_at = datetime_from_millis(row.created_at);
        Inquiry {
            status: decode_enum(row.status.as_deref(), "status", &row.id),
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            customer_name: row.customer_name,
            phone: row.phone,
            email: row.email,
            message: row.message,
            proposed_price: row.proposed_price,
            created_at,
            updated_at: row.updated_at.map_or(created_at, |ms| datetime_from_millis(Some(ms))),
        }
    }
}

/// Fields captured from the public form plus the resolved product name
#[derive(Debug, Clone, Default)]
pub struct NewInquiry {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub proposed_price: Option<f64>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Inquiry>> {
    let rows = sqlx::query_as::<_, InquiryRow>(&format!(
        "SELECT {COLUMNS} FROM inquiries ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Inquiry::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Inquiry>> {
    let row = sqlx::query_as::<_, InquiryRow>(&format!("SELECT {COLUMNS} FROM inquiries WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Inquiry::from))
}

pub async fn create(pool: &SqlitePool, data: NewInquiry) -> RepoResult<Inquiry> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(&format!(
        "INSERT INTO inquiries ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"
    ))
    .bind(id)
    .bind(data.product_id)
    .bind(&data.product_name)
    .bind(&data.customer_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.message)
    .bind(data.proposed_price)
    .bind(InquiryStatus::New.as_str())
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inquiry".into()))
}

/// Any status may follow any other
pub async fn update_status(pool: &SqlitePool, id: i64, status: InquiryStatus) -> RepoResult<Inquiry> {
    let rows = sqlx::query("UPDATE inquiries SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status.as_str())
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Inquiry {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inquiry {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM inquiries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count_by_status(pool: &SqlitePool, status: InquiryStatus) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inquiries WHERE COALESCE(status, 'new') = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
    Ok(n)
}

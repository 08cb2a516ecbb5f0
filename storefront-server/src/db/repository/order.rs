//! Order Repository
//!
//! Orders are append-only: no update or delete helpers exist.

use super::{RepoError, RepoResult};
use shared::models::{CustomerContact, Order, OrderItem};
use shared::util::{datetime_from_millis, now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, items, total, customer_name, customer_phone, customer_email, customer_comment, status, created_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    items: String,
    total: f64,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    customer_comment: Option<String>,
    status: String,
    created_at: Option<i64>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items).unwrap_or_else(|e| {
            tracing::warn!(order_id = row.id, error = %e, "Stored order items are unreadable");
            Vec::new()
        });
        Order {
            id: row.id,
            items,
            total: row.total,
            customer: CustomerContact {
                name: row.customer_name,
                phone: row.customer_phone,
                email: row.customer_email,
                comment: row.customer_comment,
            },
            status: row.status,
            created_at: datetime_from_millis(row.created_at),
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Order::from))
}

/// Persist a checkout snapshot. The total is computed from the items.
pub async fn create(
    pool: &SqlitePool,
    items: Vec<OrderItem>,
    customer: CustomerContact,
) -> RepoResult<Order> {
    let id = snowflake_id();
    let total: f64 = items.iter().map(OrderItem::line_total).sum();
    let items_json =
        serde_json::to_string(&items).map_err(|e| RepoError::Validation(e.to_string()))?;

    sqlx::query(&format!(
        "INSERT INTO orders ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'new', ?8)"
    ))
    .bind(id)
    .bind(items_json)
    .bind(total)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.comment)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn revenue(pool: &SqlitePool) -> RepoResult<f64> {
    let total: Option<f64> = sqlx::query_scalar("SELECT SUM(total) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(total.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn create_computes_total_and_reads_back() {
        let db = DbService::in_memory().await.unwrap();
        let items = vec![
            OrderItem {
                product_id: 1,
                name: "Brake disc".into(),
                part_number: "BD-1".into(),
                price: 50.0,
                quantity: 2,
            },
            OrderItem {
                product_id: 2,
                name: "Pads".into(),
                part_number: "BP-9".into(),
                price: 25.5,
                quantity: 1,
            },
        ];
        let order = create(
            &db.pool,
            items,
            CustomerContact {
                name: "Anna".into(),
                phone: "123".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(order.total, 125.5);
        assert_eq!(order.status, "new");
        assert_eq!(order.items.len(), 2);
        assert_eq!(count(&db.pool).await.unwrap(), 1);
        assert_eq!(revenue(&db.pool).await.unwrap(), 125.5);
    }
}

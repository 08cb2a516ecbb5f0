//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerContact};
use shared::util::{datetime_from_millis, now_millis, snowflake_id};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    phone: String,
    email: Option<String>,
    orders_count: i64,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        let created_at = datetime_from_millis(row.created_at);
        Customer {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            orders_count: row.orders_count,
            created_at,
            updated_at: row.updated_at.map_or(created_at, |ms| datetime_from_millis(Some(ms))),
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let rows = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, phone, email, orders_count, created_at, updated_at FROM customers ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Customer::from).collect())
}

pub async fn find_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Option<Customer>> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, phone, email, orders_count, created_at, updated_at FROM customers WHERE phone = ?",
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Customer::from))
}

/// Insert or refresh the buyer keyed by phone and bump their order count
pub async fn record_order(pool: &SqlitePool, contact: &CustomerContact) -> RepoResult<Customer> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO customers (id, name, phone, email, orders_count, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5) \
         ON CONFLICT(phone) DO UPDATE SET name = excluded.name, email = COALESCE(excluded.email, customers.email), orders_count = customers.orders_count + 1, updated_at = excluded.updated_at",
    )
    .bind(snowflake_id())
    .bind(&contact.name)
    .bind(contact.phone.trim())
    .bind(&contact.email)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_phone(pool, contact.phone.trim())
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert customer".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn repeat_buyer_is_upserted_by_phone() {
        let db = DbService::in_memory().await.unwrap();
        let first = CustomerContact {
            name: "Petr".into(),
            phone: " 555-01 ".into(),
            email: Some("petr@example.com".into()),
            comment: None,
        };
        record_order(&db.pool, &first).await.unwrap();

        let second = CustomerContact {
            name: "Petr Ivanov".into(),
            phone: "555-01".into(),
            email: None,
            comment: None,
        };
        let c = record_order(&db.pool, &second).await.unwrap();

        assert_eq!(c.orders_count, 2);
        assert_eq!(c.name, "Petr Ivanov");
        assert_eq!(c.email.as_deref(), Some("petr@example.com"));
        assert_eq!(find_all(&db.pool).await.unwrap().len(), 1);
    }
}

//! Operator Repository

use super::{RepoError, RepoResult, decode_enum};
use shared::models::{PermissionSet, User, UserRole, UserUpdate};
use shared::util::{datetime_from_millis, now_millis};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, email, display_name, role, permissions, is_active, approval_status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    display_name: Option<String>,
    role: String,
    permissions: Option<String>,
    is_active: bool,
    approval_status: String,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse::<UserRole>().unwrap_or_else(|e| {
            tracing::warn!(user_id = %row.id, error = %e, "Unknown stored role, using viewer");
            UserRole::Viewer
        });
        let permissions: PermissionSet = row
            .permissions
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        let created_at = datetime_from_millis(row.created_at);
        User {
            approval_status: decode_enum(Some(row.approval_status.as_str()), "approval_status", &row.id),
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            role,
            permissions,
            is_active: row.is_active,
            created_at,
            updated_at: row.updated_at.map_or(created_at, |ms| datetime_from_millis(Some(ms))),
        }
    }
}

fn encode_permissions(permissions: &PermissionSet) -> String {
    serde_json::to_string(permissions).unwrap_or_else(|_| "{}".to_string())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at, id"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(User::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn insert(pool: &SqlitePool, user: &User) -> RepoResult<User> {
    sqlx::query(&format!(
        "INSERT INTO users ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    ))
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .bind(encode_permissions(&user.permissions))
    .bind(user.is_active)
    .bind(user.approval_status.as_str())
    .bind(user.created_at.timestamp_millis())
    .bind(user.updated_at.timestamp_millis())
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("User {} already registered", user.id)),
        other => other,
    })?;

    find_by_id(pool, &user.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: &str, data: UserUpdate) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET display_name = COALESCE(?1, display_name), role = COALESCE(?2, role), permissions = COALESCE(?3, permissions), is_active = COALESCE(?4, is_active), approval_status = COALESCE(?5, approval_status), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.display_name)
    .bind(data.role.map(|r| r.as_str()))
    .bind(data.permissions.as_ref().map(encode_permissions))
    .bind(data.is_active)
    .bind(data.approval_status.map(|s| s.as_str()))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{ApprovalStatus, Permission};

    fn operator(id: &str) -> User {
        let now = chrono::Utc::now();
        User {
            id: id.into(),
            email: format!("{id}@shop.test"),
            display_name: None,
            role: UserRole::Manager,
            permissions: PermissionSet::from_permissions(&[Permission::EditProducts]),
            is_active: true,
            approval_status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_update_and_duplicate() {
        let db = DbService::in_memory().await.unwrap();
        let user = insert(&db.pool, &operator("uid-1")).await.unwrap();
        assert!(user.permissions.has(Permission::EditProducts));
        assert!(!user.permissions.has(Permission::ManageUsers));

        let err = insert(&db.pool, &operator("uid-1")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let approved = update(
            &db.pool,
            "uid-1",
            UserUpdate {
                approval_status: Some(ApprovalStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert_eq!(approved.role, UserRole::Manager);
        assert_eq!(count(&db.pool).await.unwrap(), 1);
    }
}

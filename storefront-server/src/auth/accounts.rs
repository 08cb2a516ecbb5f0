//! Operator registration and administration rules

use chrono::Utc;
use shared::models::{ApprovalStatus, User, UserRole, UserUpdate};
use sqlx::SqlitePool;

use crate::audit_log;
use crate::auth::permissions::role_defaults;
use crate::auth::{CurrentUser, Identity};
use crate::db::repository::{RepoError, user};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Create the operator record for a verified identity.
///
/// The first account becomes an approved admin; everyone after that starts
/// as a pending viewer.
pub async fn register(pool: &SqlitePool, identity: &Identity) -> AppResult<User> {
    if user::find_by_id(pool, &identity.subject).await?.is_some() {
        return Err(AppError::new(ErrorCode::UserAlreadyRegistered));
    }

    let first = user::count(pool).await? == 0;
    let (role, approval_status) = if first {
        (UserRole::Admin, ApprovalStatus::Approved)
    } else {
        (UserRole::Viewer, ApprovalStatus::Pending)
    };
    let now = Utc::now();
    let record = User {
        id: identity.subject.clone(),
        email: identity.email.clone(),
        display_name: identity.name.clone(),
        role,
        permissions: role_defaults(role),
        is_active: true,
        approval_status,
        created_at: now,
        updated_at: now,
    };

    let created = user::insert(pool, &record).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::UserAlreadyRegistered),
        other => other.into(),
    })?;
    tracing::info!(user_id = %created.id, role = %created.role, first, "Operator registered");
    Ok(created)
}

/// Apply an admin edit to another operator.
///
/// A role change without an explicit permission set resets the set to the
/// new role's defaults. Nobody may deactivate, demote or un-approve
/// themselves.
pub async fn update_operator(
    pool: &SqlitePool,
    actor: &CurrentUser,
    id: &str,
    mut data: UserUpdate,
) -> AppResult<User> {
    let existing = user::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))?;

    if existing.id == actor.id {
        let deactivates = data.is_active == Some(false);
        let demotes = data.role.is_some_and(|r| r != existing.role);
        let unapproves = data.approval_status == Some(ApprovalStatus::Pending);
        if deactivates || demotes || unapproves {
            return Err(AppError::new(ErrorCode::CannotModifySelf));
        }
    }

    if let Some(role) = data.role {
        if data.permissions.is_none() && role != existing.role {
            data.permissions = Some(role_defaults(role));
        }
    }

    let updated = user::update(pool, id, data).await?;
    audit_log!(
        actor.id.as_str(),
        "update_operator",
        "users",
        format!("{} role={} active={} approval={}", updated.id, updated.role, updated.is_active, updated.approval_status.as_str())
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::Permission;

    fn identity(sub: &str) -> Identity {
        Identity {
            subject: sub.into(),
            email: format!("{sub}@shop.test"),
            name: None,
        }
    }

    fn actor(user: &User) -> CurrentUser {
        CurrentUser::admit(user).unwrap()
    }

    #[tokio::test]
    async fn first_user_is_admin_rest_are_pending() {
        let db = DbService::in_memory().await.unwrap();
        let first = register(&db.pool, &identity("a")).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);
        assert_eq!(first.approval_status, ApprovalStatus::Approved);

        let second = register(&db.pool, &identity("b")).await.unwrap();
        assert_eq!(second.role, UserRole::Viewer);
        assert_eq!(second.approval_status, ApprovalStatus::Pending);
        assert_eq!(second.permissions.granted(), vec![Permission::ViewStats]);

        let err = register(&db.pool, &identity("b")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserAlreadyRegistered);
    }

    #[tokio::test]
    async fn role_change_resets_permissions_unless_given() {
        let db = DbService::in_memory().await.unwrap();
        let admin = register(&db.pool, &identity("a")).await.unwrap();
        register(&db.pool, &identity("b")).await.unwrap();

        let promoted = update_operator(
            &db.pool,
            &actor(&admin),
            "b",
            UserUpdate {
                role: Some(UserRole::Manager),
                approval_status: Some(ApprovalStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(promoted.permissions.has(Permission::ImportData));
        assert!(!promoted.permissions.has(Permission::DeleteProducts));

        let mut custom = promoted.permissions;
        custom.set(Permission::ImportData, false);
        let edited = update_operator(
            &db.pool,
            &actor(&admin),
            "b",
            UserUpdate {
                permissions: Some(custom),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!edited.permissions.has(Permission::ImportData));
        assert_eq!(edited.role, UserRole::Manager);
    }

    #[tokio::test]
    async fn cannot_demote_or_disable_self() {
        let db = DbService::in_memory().await.unwrap();
        let admin = register(&db.pool, &identity("a")).await.unwrap();
        let me = actor(&admin);

        for data in [
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
            UserUpdate {
                role: Some(UserRole::Viewer),
                ..Default::default()
            },
        ] {
            let err = update_operator(&db.pool, &me, "a", data).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::CannotModifySelf);
        }

        let renamed = update_operator(
            &db.pool,
            &me,
            "a",
            UserUpdate {
                display_name: Some("Boss".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.display_name.as_deref(), Some("Boss"));

        let err = update_operator(&db.pool, &me, "nobody", UserUpdate::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}

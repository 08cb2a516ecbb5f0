//! Operator account handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{PermissionSet, User, UserUpdate};

use crate::auth::accounts;
use crate::auth::permissions::effective_permissions;
use crate::auth::{CurrentUser, Identity};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    /// Permissions actually enforced (admins hold all)
    pub effective_permissions: PermissionSet,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        let effective_permissions = effective_permissions(&user);
        Self {
            user,
            effective_permissions,
        }
    }
}

/// POST /api/users/register
pub async fn register(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<(StatusCode, Json<ApiResponse<Profile>>)> {
    let created = accounts::register(&state.pool, &identity).await?;
    Ok((StatusCode::CREATED, ok(Profile::from(created))))
}

/// GET /api/users/me
///
/// Works for pending and disabled accounts too so the client can show why
/// the back office is closed.
pub async fn me(State(state): State<ServerState>, identity: Identity) -> AppResult<Json<ApiResponse<Profile>>> {
    let found = user::find_by_id(&state.pool, &identity.subject)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotRegistered))?;
    Ok(ok(Profile::from(found)))
}

/// GET /api/admin/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Profile>>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(ok(users.into_iter().map(Profile::from).collect()))
}

/// GET /api/admin/users/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<ApiResponse<Profile>>> {
    let found = user::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))?;
    Ok(ok(Profile::from(found)))
}

/// PUT /api/admin/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let updated = accounts::update_operator(&state.pool, &actor, &id, payload).await?;
    Ok(ok(Profile::from(updated)))
}

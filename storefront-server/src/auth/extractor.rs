//! Request identity extractors
//!
//! Two layers:
//! - [`Identity`]: a verified bearer token, nothing more. Enough for
//!   registration and `/me`.
//! - [`CurrentUser`]: an approved, active operator record with its
//!   effective permissions. Required by every admin route.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Uri, request::Parts},
};
use serde::Serialize;
use shared::models::{ApprovalStatus, Permission, PermissionSet, User, UserRole};
use sqlx::SqlitePool;

use crate::auth::permissions::effective_permissions;
use crate::auth::{Claims, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// Verified token subject
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            name: claims.name.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Operator allowed through the admin gate
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.has(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Apply the access gate to a stored operator record
    pub fn admit(user: &User) -> Result<Self, AppError> {
        if !user.is_active {
            security_log!(WARN, "account_disabled", user_id = %user.id);
            return Err(AppError::account_disabled());
        }
        if user.approval_status != ApprovalStatus::Approved {
            security_log!(INFO, "account_pending", user_id = %user.id);
            return Err(AppError::pending_approval());
        }
        Ok(Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            permissions: effective_permissions(user),
        })
    }
}

/// Validate the `Authorization: Bearer` header
pub fn identity_from_headers(headers: &HeaderMap, uri: &Uri, jwt: &JwtService) -> Result<Identity, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %uri);
            return Err(AppError::unauthorized());
        }
    };

    match jwt.validate_token(token) {
        Ok(claims) => Ok(Identity::from(claims)),
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %uri);
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Resolve a verified identity to an admitted operator
pub async fn load_operator(pool: &SqlitePool, identity: &Identity) -> Result<CurrentUser, AppError> {
    let record = user::find_by_id(pool, &identity.subject).await?.ok_or_else(|| {
        security_log!(WARN, "account_not_registered", subject = %identity.subject);
        AppError::new(ErrorCode::AccountNotRegistered)
    })?;
    CurrentUser::admit(&record)
}

impl FromRequestParts<ServerState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let identity = identity_from_headers(&parts.headers, &parts.uri, state.get_jwt_service())?;
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        // Set by `require_operator`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let identity = Identity::from_request_parts(parts, state).await?;
        let user = load_operator(&state.pool, &identity).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use chrono::Utc;

    fn record(role: UserRole, active: bool, approval: ApprovalStatus) -> User {
        User {
            id: "uid-1".into(),
            email: "op@shop.test".into(),
            display_name: Some("Op".into()),
            role,
            permissions: PermissionSet::from_permissions(&[Permission::ViewStats]),
            is_active: active,
            approval_status: approval,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn gate_rejects_disabled_then_pending() {
        let err = CurrentUser::admit(&record(UserRole::Viewer, false, ApprovalStatus::Pending)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);

        let err = CurrentUser::admit(&record(UserRole::Viewer, true, ApprovalStatus::Pending)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountPendingApproval);

        let admitted = CurrentUser::admit(&record(UserRole::Admin, true, ApprovalStatus::Approved)).unwrap();
        assert!(admitted.is_admin());
        assert!(admitted.has_permission(Permission::ManageUsers));
    }

    #[test]
    fn bearer_header_is_required() {
        let jwt = JwtService::with_config(crate::auth::JwtConfig::ephemeral("idp", "storefront"));
        let uri: Uri = "/api/users/me".parse().unwrap();

        let err = identity_from_headers(&HeaderMap::new(), &uri, &jwt).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, "Bearer nonsense".parse().unwrap());
        let err = identity_from_headers(&headers, &uri, &jwt).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);

        let token = jwt.generate_token("uid-9", "a@b.c", Some("  ")).unwrap();
        headers.insert(http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        let identity = identity_from_headers(&headers, &uri, &jwt).unwrap();
        assert_eq!(identity.subject, "uid-9");
        assert_eq!(identity.name, None);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_registered() {
        let db = DbService::in_memory().await.unwrap();
        let identity = Identity {
            subject: "ghost".into(),
            email: String::new(),
            name: None,
        };
        let err = load_operator(&db.pool, &identity).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountNotRegistered);
    }
}

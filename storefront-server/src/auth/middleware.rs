//! Authentication middleware
//!
//! Layered on nested routers rather than globally, so public storefront
//! routes never see it.
//!
//! | Layer | Injects | Failure |
//! |-------|---------|---------|
//! | [`require_auth`] | [`Identity`] | 401 |
//! | [`require_operator`] | [`Identity`] + [`CurrentUser`] | 401 / 403 |
//! | [`require_permission`] | - | 403 |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::Permission;

use crate::auth::extractor::{Identity, identity_from_headers, load_operator};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// Require a valid bearer token
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let identity = identity_from_headers(req.headers(), req.uri(), state.get_jwt_service())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Require a registered, active and approved operator
pub async fn require_operator(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let identity: Identity = identity_from_headers(req.headers(), req.uri(), state.get_jwt_service())?;
    let user = load_operator(&state.pool, &identity).await?;
    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require one permission. Must sit inside [`require_operator`].
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_permission(Permission::CreateProducts)));
/// ```
pub fn require_permission(
    permission: Permission,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    WARN,
                    "permission_denied",
                    user_id = %user.id,
                    role = %user.role,
                    required_permission = %permission
                );
                return Err(AppError::with_message(
                    ErrorCode::PermissionDenied,
                    format!("Permission denied: {permission}"),
                )
                .with_detail("permission", permission.as_str()));
            }

            Ok(next.run(req).await)
        })
    }
}

//! Notification forwarding
//!
//! `POST /api/notify` takes `{ "type": "order" | "inquiry", "data": {...} }`
//! and posts the formatted message to the staff chat. With no chat
//! configured it answers `notified: false`; a chat API failure is a 502.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;

use crate::core::ServerState;
use crate::notify::{NotificationPayload, NotifyError};
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/notify", post(forward))
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub notified: bool,
}

async fn forward(
    State(state): State<ServerState>,
    Json(payload): Json<NotificationPayload>,
) -> AppResult<Json<ApiResponse<NotifyResponse>>> {
    match state.notifier.notify(&payload).await {
        Ok(()) => Ok(ok(NotifyResponse { notified: true })),
        Err(NotifyError::Disabled) => Ok(ok(NotifyResponse { notified: false })),
        Err(e) => {
            tracing::warn!(kind = payload.kind(), error = %e, "Forwarded notification failed");
            Err(e.into())
        }
    }
}

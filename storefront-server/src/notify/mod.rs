//! Staff chat notifications
//!
//! New orders and inquiries are posted to a chat bot API. Delivery is best
//! effort: callers persist first and treat a failed send as a warning.

pub mod message;

pub use message::NotificationPayload;

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are not configured")]
    Disabled,

    /// Never carries the request URL: it embeds the bot token
    #[error("chat API request failed: {0}")]
    Http(reqwest::Error),

    #[error("chat API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.without_url())
    }
}

/// Clients only learn that delivery failed; the cause stays in the logs
impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::Disabled => AppError::new(ErrorCode::NotificationDisabled),
            NotifyError::Http(_) => AppError::new(ErrorCode::NotificationFailed),
            NotifyError::Rejected { status, .. } => {
                AppError::new(ErrorCode::NotificationFailed).with_detail("upstream_status", status)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct ChatTarget {
    token: String,
    chat_id: String,
    api_base: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Chat bot client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    target: Option<ChatTarget>,
}

impl Notifier {
    /// Enabled only when both a bot token and a chat id are set
    pub fn new(token: Option<String>, chat_id: Option<String>, api_base: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let target = match (token, chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => Some(ChatTarget {
                token,
                chat_id,
                api_base: api_base.into().trim_end_matches('/').to_string(),
            }),
            _ => None,
        };
        Self { client, target }
    }

    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            target: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Post pre-formatted HTML text
    pub async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let target = self.target.as_ref().ok_or(NotifyError::Disabled)?;
        let url = format!("{}/bot{}/sendMessage", target.api_base, target.token);

        let resp = self
            .client
            .post(url)
            .json(&SendMessage {
                chat_id: &target.chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.send_text(&payload.to_html()).await
    }

    /// Send and swallow the error. Returns whether the message was delivered.
    pub async fn notify_best_effort(&self, payload: &NotificationPayload) -> bool {
        match self.notify(payload).await {
            Ok(()) => true,
            Err(NotifyError::Disabled) => false,
            Err(e) => {
                tracing::warn!(kind = payload.kind(), error = %e, "Chat notification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use shared::models::{CustomerContact, Order};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Inbox = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    async fn fake_chat_api(status: StatusCode) -> (String, Inbox) {
        let inbox: Inbox = Arc::default();
        let app = Router::new()
            .route(
                "/{bot}/sendMessage",
                post(
                    move |State(inbox): State<Inbox>, axum::extract::Path(bot): axum::extract::Path<String>, Json(body): Json<serde_json::Value>| async move {
                        inbox.lock().await.push((bot, body));
                        (status, Json(serde_json::json!({ "ok": status.is_success() })))
                    },
                ),
            )
            .with_state(inbox.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), inbox)
    }

    fn payload() -> NotificationPayload {
        NotificationPayload::Order(Order {
            id: 1,
            items: Vec::new(),
            total: 0.0,
            customer: CustomerContact {
                name: "Oleg".into(),
                phone: "1".into(),
                ..Default::default()
            },
            status: "new".into(),
            created_at: chrono::Utc::now(),
        })
    }

    #[tokio::test]
    async fn posts_html_message_to_bot_endpoint() {
        let (base, inbox) = fake_chat_api(StatusCode::OK).await;
        let notifier = Notifier::new(Some("T0KEN".into()), Some("-100".into()), base, Duration::from_secs(5));

        assert!(notifier.notify_best_effort(&payload()).await);
        let sent = inbox.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "botT0KEN");
        assert_eq!(sent[0].1["chat_id"], "-100");
        assert_eq!(sent[0].1["parse_mode"], "HTML");
        assert!(sent[0].1["text"].as_str().unwrap().contains("Oleg"));
    }

    #[tokio::test]
    async fn rejection_is_reported_not_raised() {
        let (base, _) = fake_chat_api(StatusCode::BAD_REQUEST).await;
        let notifier = Notifier::new(Some("t".into()), Some("c".into()), base, Duration::from_secs(5));

        let err = notifier.notify(&payload()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 400, .. }));
        assert!(!notifier.notify_best_effort(&payload()).await);
        assert_eq!(AppError::from(err).code, ErrorCode::NotificationFailed);
    }

    #[tokio::test]
    async fn unreachable_chat_api_does_not_expose_the_token() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let notifier = Notifier::new(Some("SECRET-BOT-TOKEN".into()), Some("c".into()), base, Duration::from_secs(2));

        let err = notifier.notify(&payload()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
        assert!(!err.to_string().contains("SECRET-BOT-TOKEN"));

        let app_err = AppError::from(err);
        assert_eq!(app_err.code, ErrorCode::NotificationFailed);
        assert!(!app_err.message.contains("SECRET-BOT-TOKEN"));
        assert!(!format!("{app_err:?}").contains("SECRET-BOT-TOKEN"));
    }

    #[tokio::test]
    async fn missing_credentials_disable_sending() {
        let notifier = Notifier::new(Some("t".into()), None, "http://unused", Duration::from_secs(1));
        assert!(!notifier.is_enabled());
        assert!(matches!(notifier.send_text("x").await, Err(NotifyError::Disabled)));
        assert!(!Notifier::disabled().notify_best_effort(&payload()).await);
    }
}

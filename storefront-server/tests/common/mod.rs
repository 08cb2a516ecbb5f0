#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::{Product, ProductCreate};
use storefront_server::db::DbService;
use storefront_server::db::repository::product;
use storefront_server::{Config, ServerState, api};
use tower::ServiceExt;

pub async fn test_state() -> ServerState {
    let db = DbService::in_memory().await.expect("in-memory db");
    ServerState::new(Config::for_tests("./target/test-data"), db.pool)
}

pub fn app(state: &ServerState) -> Router {
    api::build_app(state).with_state(state.clone())
}

pub fn token(state: &ServerState, subject: &str) -> String {
    state
        .get_jwt_service()
        .generate_token(subject, &format!("{subject}@shop.test"), None)
        .expect("token")
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }

    pub fn code(&self) -> u64 {
        self.json()["code"].as_u64().unwrap_or(0)
    }
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let resp = app
        .clone()
        .oneshot(req.body(Body::from(body)).expect("request"))
        .await
        .expect("infallible");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes().to_vec();
    Reply { status, headers, bytes }
}

pub async fn send(app: &Router, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Reply {
    match body {
        Some(v) => send_raw(app, method, uri, bearer, Some("application/json"), v.to_string().into_bytes()).await,
        None => send_raw(app, method, uri, bearer, None, Vec::new()).await,
    }
}

pub async fn seed_product(state: &ServerState, name: &str, part: &str, price: f64, category_id: Option<i64>) -> Product {
    product::create(
        &state.pool,
        ProductCreate {
            name: name.into(),
            part_number: part.into(),
            price,
            category_id,
            ..Default::default()
        },
        None,
    )
    .await
    .expect("seed product")
}

/// Register `subject` (first call makes an admin) and return its token
pub async fn register(app: &Router, state: &ServerState, subject: &str) -> String {
    let t = token(state, subject);
    let reply = send(app, Method::POST, "/api/users/register", Some(&t), None).await;
    assert_eq!(reply.status, StatusCode::CREATED, "register {subject}: {:?}", reply.json());
    t
}

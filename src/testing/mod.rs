use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::handlers::AppState;

/// App wired to a lazily connecting pool aimed at a closed port. Requests
/// that reach the database fail with a pool timeout.
pub fn unreachable_app() -> Router {
    let mut config = AppConfig::development();
    config.database.acquire_timeout_secs = 1;
    config.database.max_connections = 1;
    let pool = DatabaseManager::connect_lazy("postgres://nobody@127.0.0.1:1/none", &config.database)
        .expect("lazy pool");
    crate::app(AppState::new(pool), &config)
}

/// Send one request and decode the body as JSON (`Value::Null` when empty).
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let raw = body.map(|b| b.to_string()).unwrap_or_default();
    send_raw(app, method, uri, &raw).await
}

pub async fn send_raw(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

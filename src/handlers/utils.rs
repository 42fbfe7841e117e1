use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::database::Payload;
use crate::error::ApiError;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// CORS preflight answer: 200 with an empty body.
pub fn preflight() -> Response {
    StatusCode::OK.into_response()
}

/// Query string as raw pairs; repeated keys are kept until folded.
pub type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Request body, with buffering failures (size limit) still to be reported.
pub type BodyBytes = Result<Bytes, BytesRejection>;

/// Fold query pairs into `T`. A repeated key keeps its last value, so
/// `?sort=a&sort=b` reads as `sort=b` instead of failing.
pub fn query_params<T: DeserializeOwned>(query: QueryPairs) -> Result<T, ApiError> {
    let Query(pairs) =
        query.map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e.body_text())))?;
    let fields: Map<String, Value> = pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e)))
}

pub fn request_body(body: BodyBytes) -> Result<Bytes, ApiError> {
    body.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body too large"),
        _ => ApiError::bad_request(format!("Invalid request body: {}", e.body_text())),
    })
}

pub fn payload(body: &Bytes) -> Result<Payload, ApiError> {
    Ok(Payload::from_body(body)?)
}

/// Non-blank query value
pub fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub fn respond(result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(IntoResponse::into_response)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Success envelope: `{ success: true, message?, data?, count? }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub count: Option<usize>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            count: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// List payload with `count` set to its length.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::success(items)
        }
    }
}

impl ApiResponse<()> {
    /// Message-only success (deletes, password change).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            count: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        if let Some(message) = self.message {
            envelope.insert("message".into(), Value::String(message));
        }
        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    envelope.insert("data".into(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return crate::error::ApiError::internal_server_error("Failed to format response")
                        .into_response();
                }
            }
        }
        if let Some(count) = self.count {
            envelope.insert("count".into(), Value::from(count));
        }

        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_of(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_carries_count() {
        let resp = ApiResponse::list(vec![1, 2, 3]).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, json!({ "success": true, "data": [1, 2, 3], "count": 3 }));
    }

    #[tokio::test]
    async fn created_with_message() {
        let resp = ApiResponse::created(json!({ "id": "week_1" }))
            .with_message("Week created successfully")
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(resp).await,
            json!({ "success": true, "message": "Week created successfully", "data": { "id": "week_1" } })
        );
    }

    #[tokio::test]
    async fn message_only_has_no_data() {
        let body = body_of(ApiResponse::message("Deleted").into_response()).await;
        assert_eq!(body, json!({ "success": true, "message": "Deleted" }));
    }
}

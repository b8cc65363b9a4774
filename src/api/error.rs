//! StoreError -> HTTP response mapping
//!
//! Callers get one terminal error kind with a human-readable message; raw
//! backend error text goes to the log, never over the wire.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::StoreError;

#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(StoreError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            StoreError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            StoreError::CollectionNotFound(_) | StoreError::QuoteNotFound { .. } => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            StoreError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            StoreError::Unavailable(detail) => {
                tracing::error!("durable and memory paths both failed: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "collection storage is unavailable".to_string(),
                )
            }
            StoreError::Internal(detail) => {
                tracing::error!("collection store internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

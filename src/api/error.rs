//! API error type with structured JSON responses.
//!
//! Every failure surfaces as `{ "error": "<message>" }` with a matching
//! status code. Backend and internal failures are logged with their detail
//! and reported to the caller with a generic message — raw errors never
//! leak to the browser.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::genai::BackendError;
use crate::report::RenderError;
use crate::store::StoreError;

/// Error response body sent to the UI.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Chat backend failure: {0}")]
    Backend(#[from] BackendError),
    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
            ApiError::Backend(detail) => {
                tracing::error!(%detail, "chat backend failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process chat request".to_string(),
                )
            }
            ApiError::Render(detail) => {
                tracing::error!(%detail, "report render failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate the PDF report".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies use the boundary's JSON shape: `{"success": false, "message": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::dynamic_data::DynamicDataError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Dynamic product data engine failed.
    #[error("Dynamic data error: {0}")]
    DynamicData(#[from] DynamicDataError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error is a server-side failure worth capturing.
    const fn is_server_error(&self) -> bool {
        matches!(self, Self::DynamicData(DynamicDataError::Source(_)))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::DynamicData(DynamicDataError::InvalidBatch(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DynamicData(DynamicDataError::Source(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::DynamicData(DynamicDataError::Source(_)) => "Internal server error".to_string(),
            Self::DynamicData(err) => err.to_string(),
            Self::BadRequest(_) => self.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

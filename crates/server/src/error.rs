// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proslide_core::{GatewayError, ImportError, TableError};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::Gateway(err) => {
                tracing::error!(error = %err, "Project store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Storage error", err.to_string()),
                )
            }
            ApiError::Import(err) => {
                let (status, error_msg) = match err {
                    ImportError::EmptyTable => (StatusCode::BAD_REQUEST, "Empty upload"),
                    ImportError::Table(TableError::UnsupportedFormat(_)) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported file type")
                    }
                    ImportError::Table(_) => (StatusCode::BAD_REQUEST, "Unreadable spreadsheet"),
                };
                tracing::warn!(error = %err, "Import rejected");
                (status, ErrorResponse::with_details(error_msg, err.to_string()))
            }
            ApiError::NotFound(path) => {
                tracing::warn!(path = %path, "Unknown API route");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Not found", path.clone()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

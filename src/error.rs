/// Unified error types for the Giftpool recorder service
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the recorder service
///
/// Audit and badge side effects never surface these to their callers; they
/// only escape from configuration, startup and request validation.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Remote function transport errors
    #[error("Remote function error: {0}")]
    Http(#[from] reqwest::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body returned by the HTTP API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for RecorderError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            RecorderError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            RecorderError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            RecorderError::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "UpstreamError",
                "Remote function unavailable".to_string(),
            ),
            RecorderError::Database(_)
            | RecorderError::Internal(_)
            | RecorderError::Io(_)
            | RecorderError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for RecorderError {
    fn from(rejection: JsonRejection) -> Self {
        RecorderError::Validation(rejection.body_text())
    }
}

/// Result type alias for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;

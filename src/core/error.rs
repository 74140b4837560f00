//! Error type system for the MangaM portal
//!
//! This module provides the portal-wide error type with:
//! - Classification of backend read/write/transport failures
//! - Error context and chaining support
//! - HTTP status code mapping for the portal's own responses
//! - Detailed error messages with trace IDs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the MangaM portal
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    // System-level errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Backend call errors
    #[error("Backend read failed: {0}")]
    FetchError(String),

    #[error("Backend write failed: {0}")]
    WriteError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    // Request-side errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Image proxy policy
    #[error("Image host not allowed: {0}")]
    ForbiddenImageHost(String),
}

impl PortalError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            PortalError::InvalidRequest(_) | PortalError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }

            // 403 Forbidden
            PortalError::ForbiddenImageHost(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway: the backend (or an image host) failed us
            PortalError::FetchError(_)
            | PortalError::WriteError(_)
            | PortalError::NetworkError(_)
            | PortalError::DeserializationError(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            PortalError::ConfigError(_) | PortalError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            PortalError::ConfigError(_) => "ConfigError",
            PortalError::IoError(_) => "IoError",
            PortalError::FetchError(_) => "FetchError",
            PortalError::WriteError(_) => "WriteError",
            PortalError::NetworkError(_) => "NetworkError",
            PortalError::DeserializationError(_) => "DeserializationError",
            PortalError::InvalidRequest(_) => "InvalidRequest",
            PortalError::ValidationError(_) => "ValidationError",
            PortalError::NotFound(_) => "NotFound",
            PortalError::ForbiddenImageHost(_) => "ForbiddenImageHost",
        }
    }

    /// Check if this error is retryable
    ///
    /// Reads are idempotent, so a failed fetch may be reissued. Writes are
    /// not flagged: the caller cannot know whether the backend applied the
    /// change before the response was lost.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortalError::NetworkError(_) | PortalError::FetchError(_)
        )
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a new error response with a specific trace ID
    pub fn with_trace_id(error: String, message: String, trace_id: String) -> Self {
        Self {
            error,
            message,
            trace_id,
        }
    }

    /// Create an error response from a PortalError
    pub fn from_error(error: &PortalError) -> Self {
        Self::new(error.error_type().to_string(), error.to_string())
    }

    /// Create an error response from a PortalError with a specific trace ID
    pub fn from_error_with_trace_id(error: &PortalError, trace_id: String) -> Self {
        Self::with_trace_id(error.error_type().to_string(), error.to_string(), trace_id)
    }
}

/// Implement IntoResponse for PortalError to enable automatic error handling in Axum
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        // Log the error with trace ID
        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with PortalError
pub type Result<T> = std::result::Result<T, PortalError>;

/// Context extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context_str = context.into();
            PortalError::ConfigError(format!("{}: {}", context_str, e))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context_str = f();
            PortalError::ConfigError(format!("{}: {}", context_str, e))
        })
    }
}

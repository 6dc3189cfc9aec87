//! Error type system for the library catalog
//!
//! This module provides:
//! - A single error enum shared by the store, the services and the API layer
//! - HTTP status code mapping
//! - JSON error bodies carrying a trace ID

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Main error type for the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::ValidationError(_)
            | CatalogError::DeserializationError(_) => StatusCode::BAD_REQUEST,

            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,

            CatalogError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,

            CatalogError::DatabaseError(_)
            | CatalogError::PoolError(_)
            | CatalogError::IoError(_)
            | CatalogError::NetworkError(_)
            | CatalogError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            CatalogError::DatabaseError(_) => "DatabaseError",
            CatalogError::PoolError(_) => "PoolError",
            CatalogError::ValidationError(_) => "ValidationError",
            CatalogError::NotFound(_) => "NotFound",
            CatalogError::Timeout(_) => "Timeout",
            CatalogError::IoError(_) => "IoError",
            CatalogError::NetworkError(_) => "NetworkError",
            CatalogError::DeserializationError(_) => "DeserializationError",
            CatalogError::TaskError(_) => "TaskError",
        }
    }

    /// Whether this error carries internal detail that should not reach clients
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Trace ID of the failed request
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create an error response for a specific trace ID
    pub fn with_trace_id(error: String, message: String, trace_id: String) -> Self {
        Self { error, message, trace_id }
    }

    /// Build the client-facing response for an error.
    ///
    /// Internal failures are reported with a generic message; the detail goes
    /// to the log under the same trace ID.
    pub fn from_error_with_trace_id(error: &CatalogError, trace_id: String) -> Self {
        let message = if error.is_internal() {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };
        Self::with_trace_id(error.error_type().to_string(), message, trace_id)
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        // Outside a request scope (unit tests, startup) a fresh ID is used.
        let trace_id = crate::api::middleware::current_trace_id()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let error_response = ErrorResponse::from_error_with_trace_id(&self, trace_id);

        if self.is_internal() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

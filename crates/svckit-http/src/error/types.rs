//! API error types.

use crate::cache::CacheError;
use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;
use svckit_common_log::LoggableError;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: String,
    /// Rule that failed (`required`, `email`, `length`, ...).
    pub tag: String,
    /// Human readable description.
    pub message: String,
}

/// Every rule violation found on one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Violations in field order.
    pub errors: Vec<FieldViolation>,
    /// Status the failure is reported with.
    pub status: StatusCode,
}

impl ValidationFailure {
    /// A failure reported as `400 Bad Request`.
    pub fn new(errors: Vec<FieldViolation>) -> Self {
        Self {
            errors,
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) => write!(f, "{}", first.message),
            None => f.write_str("validation failed"),
        }
    }
}

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Path parameter missing or unparsable.
    #[error("invalid param {0}")]
    InvalidPathParam(String),

    /// Query parameter unparsable or negative.
    #[error("invalid query param {0}")]
    InvalidQueryParam(String),

    /// Payload failed its validation rules.
    #[error("{0}")]
    Validation(ValidationFailure),

    // 401 Unauthorized
    /// Missing or rejected bearer token.
    #[error("unauthorized")]
    Unauthorized,

    // 404 Not Found
    /// Named resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Failure with a caller-chosen message and status.
    #[error("{message}")]
    Application {
        /// Message shown to the client.
        message: String,
        /// Response status.
        status: StatusCode,
    },

    /// Cache failure; a miss maps to 404.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    // 500 Internal Server Error
    /// Unexpected failure. Details stay in the logs.
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Application error with an explicit status.
    ///
    /// Codes that are not valid HTTP statuses become `500`.
    pub fn app(message: impl Into<String>, status: u16) -> Self {
        Self::Application {
            message: message.into(),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidPathParam(_) | Self::InvalidQueryParam(_) => {
                StatusCode::BAD_REQUEST
            }

            Self::Validation(failure) => failure.status,

            Self::Unauthorized => StatusCode::UNAUTHORIZED,

            Self::NotFound(_) | Self::Cache(CacheError::NotFound) => StatusCode::NOT_FOUND,

            Self::Application { status, .. } => *status,

            Self::Cache(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::InvalidPathParam(_) => "invalid_path_param",
            Self::InvalidQueryParam(_) => "invalid_query_param",
            Self::Validation(_) => "validation_error",
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) | Self::Cache(CacheError::NotFound) => "not_found",
            Self::Application { .. } => "application_error",
            Self::Cache(_) => "cache_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Check if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl LoggableError for ApiError {
    fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Cache(CacheError::NotFound))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        ApiError::Validation(failure)
    }
}

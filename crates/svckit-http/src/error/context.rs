//! Error context utilities.

use super::types::ApiError;
use tracing::error;

/// Extension trait for converting foreign errors into [`ApiError`] where they happen.
pub trait ErrorContext<T> {
    /// Wrap the error as an internal error carrying `context`.
    fn context(self, context: impl Into<String>) -> Result<T, ApiError>;

    /// Replace the error with an application error.
    ///
    /// The source error is logged; the client only sees `message`.
    fn or_app(self, message: impl Into<String>, status: u16) -> Result<T, ApiError>;

    /// Report the failure as a missing resource.
    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ErrorContext<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::Internal(anyhow::Error::from(e).context(context.into())))
    }

    fn or_app(self, message: impl Into<String>, status: u16) -> Result<T, ApiError> {
        self.map_err(|e| {
            let message = message.into();
            error!(error = %e, status = status, "{}", message);
            ApiError::app(message, status)
        })
    }

    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|_| ApiError::NotFound(resource.into()))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::NotFound(context.into()))
    }

    fn or_app(self, message: impl Into<String>, status: u16) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::app(message, status))
    }

    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::NotFound(resource.into()))
    }
}

/// Fail unless `cond` holds.
pub fn ensure(cond: bool, message: impl Into<String>, status: u16) -> Result<(), ApiError> {
    if cond {
        Ok(())
    } else {
        Err(ApiError::app(message, status))
    }
}

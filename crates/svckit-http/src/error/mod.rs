//! Error handling.
//!
//! Failures travel as [`ApiError`] values through `?` and are rendered once,
//! by its `IntoResponse` impl, as
//! `{"success": false, "error": {"code", "message", "fields"?}}`.

pub mod context;
pub mod response;
pub mod types;

pub use context::{ensure, ErrorContext};
pub use types::{ApiError, ApiResult, FieldViolation, ValidationFailure};

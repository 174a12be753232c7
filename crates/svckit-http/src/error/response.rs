//! Error response implementation.

use super::types::{ApiError, FieldViolation};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldViolation>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(
                error = %self,
                code = self.error_code(),
                source = ?std::error::Error::source(&self),
                "server error occurred"
            );
        } else if matches!(self, ApiError::Unauthorized) {
            warn!(error = %self, code = self.error_code(), "auth error occurred");
        }

        let status = self.status_code();
        let code = self.error_code();

        let (message, fields) = match &self {
            ApiError::Validation(failure) => (self.to_string(), Some(failure.errors.clone())),
            ApiError::Internal(err) => {
                let message = if cfg!(debug_assertions) {
                    format!("{}: {:#}", self, err)
                } else {
                    "An internal error occurred".to_string()
                };
                (message, None)
            }
            ApiError::Cache(err) if self.is_server_error() => {
                let message = if cfg!(debug_assertions) {
                    format!("cache error: {}", err)
                } else {
                    "An internal error occurred".to_string()
                };
                (message, None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code,
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_body() {
        let (status, body) = render(ApiError::Unauthorized).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "unauthorized");
        assert_eq!(body["error"]["message"], "unauthorized");
        assert!(body["error"].get("fields").is_none());
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let failure = ValidationFailure::new(vec![
            FieldViolation {
                field: "email".into(),
                tag: "email".into(),
                message: "Field validation for 'email' failed on the 'email' tag".into(),
            },
            FieldViolation {
                field: "name".into(),
                tag: "required".into(),
                message: "name is required".into(),
            },
        ]);

        let (status, body) = render(failure.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["fields"][1]["field"], "name");
        assert_eq!(body["error"]["fields"][1]["tag"], "required");
    }

    #[tokio::test]
    async fn test_application_error_keeps_status() {
        let (status, body) = render(ApiError::app("book is out of stock", 409)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "book is out of stock");
    }

    #[tokio::test]
    async fn test_internal_error_is_500() {
        let (status, body) = render(anyhow::anyhow!("pool exhausted").into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
    }
}

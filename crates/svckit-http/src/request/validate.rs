//! Body decoding and rule validation.

use crate::error::{ApiError, ApiResult, FieldViolation, ValidationFailure};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

const DECODE_BODY_FAILED: &str = "failed when decode body payload";

/// Run `data`'s validation rules.
///
/// Every failed rule becomes one [`FieldViolation`], ordered by field name.
/// Failures inside `#[validate(nested)]` fields are reported under a dotted
/// path (`address.city`, `lines[1].quantity`). Rules without their own
/// message get `Field validation for '<field>' failed on the '<tag>' tag`,
/// where `<field>` is the innermost field name.
pub fn validate_struct<T: Validate>(data: &T) -> ApiResult<()> {
    let errors = match data.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };

    let mut violations = Vec::new();
    collect_violations("", &errors, &mut violations);
    violations.sort_by(|a, b| a.field.cmp(&b.field));

    Err(ValidationFailure::new(violations).into())
}

fn collect_violations(path: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (name, kind) in errors.errors() {
        let field = if path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", path, name)
        };

        match kind {
            ValidationErrorsKind::Field(failures) => {
                out.extend(failures.iter().map(|failure| violation(name, &field, failure)));
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(&field, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_violations(&format!("{}[{}]", field, index), nested, out);
                }
            }
        }
    }
}

fn violation(name: &str, field: &str, failure: &ValidationError) -> FieldViolation {
    let tag = failure.code.to_string();
    let message = match &failure.message {
        Some(message) => message.to_string(),
        None => format!("Field validation for '{}' failed on the '{}' tag", name, tag),
    };
    FieldViolation {
        field: field.to_string(),
        tag,
        message,
    }
}

/// Decode a JSON body and validate it.
pub fn decode_body<T: DeserializeOwned + Validate>(body: &[u8]) -> ApiResult<T> {
    let data: T = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting request body");
        ApiError::BadRequest(DECODE_BODY_FAILED.to_string())
    })?;
    validate_struct(&data)?;
    Ok(data)
}

/// JSON body extractor that also runs the payload's validation rules.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::BadRequest(DECODE_BODY_FAILED.to_string()))?;
        decode_body(&body).map(ValidatedJson)
    }
}

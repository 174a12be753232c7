//! Authentication extractors for handlers.

use super::types::AuthPayload;
use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Extractor for the authenticated identity (required).
pub struct Auth(pub AuthPayload);

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPayload>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extractor for optional authenticated identity.
pub struct MaybeAuth(pub Option<AuthPayload>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(parts.extensions.get::<AuthPayload>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::types::request_with_user;
    use axum::http::Request;

    #[tokio::test]
    async fn test_auth_extractor_success() {
        let (mut parts, _) = request_with_user("user-7").into_parts();

        let Auth(payload) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(payload.user_id, "user-7");
    }

    #[tokio::test]
    async fn test_auth_extractor_missing() {
        let (mut parts, _) = Request::new(()).into_parts();

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_maybe_auth_extractor() {
        let (mut parts, _) = request_with_user("user-7").into_parts();
        let MaybeAuth(payload) = MaybeAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(payload.map(|p| p.user_id).as_deref(), Some("user-7"));

        let (mut parts, _) = Request::new(()).into_parts();
        let MaybeAuth(payload) = MaybeAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(payload.is_none());
    }
}

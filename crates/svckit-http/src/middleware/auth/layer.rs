//! Authentication middleware layer.

use super::jwt::TokenDecoder;
use crate::constants::{HEADER_AUTHORIZATION, HEADER_X_FORWARDED_AUTHORIZATION};
use crate::error::ApiError;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use svckit_common_log::Logger;
use tower::{Layer, Service};
use tracing::info;

/// Rejects requests without a valid bearer token.
///
/// The token is read from `X-Forwarded-Authorization`, falling back to
/// `Authorization`. On success the decoded
/// [`AuthPayload`](super::types::AuthPayload) is inserted into the request
/// extensions before the inner service runs.
#[derive(Clone)]
pub struct AuthLayer {
    decoder: Arc<dyn TokenDecoder>,
    log: Logger,
}

impl AuthLayer {
    /// Create new auth layer.
    pub fn new(decoder: Arc<dyn TokenDecoder>, log: Logger) -> Self {
        Self { decoder, log }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            decoder: self.decoder.clone(),
            log: self.log.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    decoder: Arc<dyn TokenDecoder>,
    log: Logger,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let decoder = self.decoder.clone();
        let log = self.log.clone();
        // Drive the instance that was polled ready, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let token = match extract_token(&req) {
                Ok(token) => token.to_string(),
                Err(err) => return Ok(err.into_response()),
            };

            match decoder.decode(&token).await {
                Ok(payload) => {
                    req.extensions_mut().insert(payload);
                }
                Err(err) => {
                    info!(parent: log.span(), error = %err, "failed when decode token");
                    return Ok(ApiError::Unauthorized.into_response());
                }
            }

            inner.call(req).await
        })
    }
}

/// Pull the bearer token out of the auth headers.
pub fn extract_token<B>(req: &Request<B>) -> Result<&str, ApiError> {
    let header = [HEADER_X_FORWARDED_AUTHORIZATION, HEADER_AUTHORIZATION]
        .into_iter()
        .filter_map(|name| req.headers().get(name))
        .find(|value| !value.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let value = header.to_str().map_err(|_| ApiError::Unauthorized)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(ApiError::Unauthorized)?;

    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    Ok(token)
}

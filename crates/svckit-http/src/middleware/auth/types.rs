//! Authentication types.

use axum::body::Body;
use axum::http::{request::Parts, Extensions, Method, Request};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identity attached to a request once its bearer token has been decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    /// Subject of the token. Empty when the request is unauthenticated.
    pub user_id: String,
}

impl AuthPayload {
    /// Identity for `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// True for the zero-value identity of an unauthenticated request.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_empty()
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id`, valid for `expires_in` seconds from now.
    pub fn new(user_id: impl Into<String>, expires_in: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.into(),
            iat: now,
            exp: now + expires_in,
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Read the identity stored by the auth gate.
///
/// Requests that never went through the gate yield the zero value.
pub trait AuthContextExt {
    /// The stored identity, or the anonymous one.
    fn auth_payload(&self) -> AuthPayload;
}

impl AuthContextExt for Extensions {
    fn auth_payload(&self) -> AuthPayload {
        self.get::<AuthPayload>().cloned().unwrap_or_default()
    }
}

impl AuthContextExt for Parts {
    fn auth_payload(&self) -> AuthPayload {
        self.extensions.auth_payload()
    }
}

impl<B> AuthContextExt for Request<B> {
    fn auth_payload(&self) -> AuthPayload {
        self.extensions().auth_payload()
    }
}

/// Attach `payload` to `req`, replacing any identity already present.
pub fn with_auth_payload<B>(mut req: Request<B>, payload: AuthPayload) -> Request<B> {
    req.extensions_mut().insert(payload);
    req
}

/// An empty `GET /` request already carrying `user_id`.
///
/// Meant for handler tests that skip the gate.
pub fn request_with_user(user_id: impl Into<String>) -> Request<Body> {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = Method::GET;
    with_auth_payload(req, AuthPayload::new(user_id))
}

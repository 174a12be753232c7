//! HTTP middleware.

pub mod auth;

pub use auth::{Auth, AuthContextExt, AuthLayer, AuthMiddleware, AuthPayload, MaybeAuth, TokenDecoder};

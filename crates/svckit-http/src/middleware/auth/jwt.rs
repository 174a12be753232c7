//! Token decoding.

use super::types::{AuthPayload, Claims};
use crate::config::AuthConfig;
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

/// Why a bearer token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token's `exp` has passed.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token or missing subject.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The decoder could not reach its backing service.
    #[error("token service unavailable: {0}")]
    Unavailable(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Resolves a bearer token to the identity it was issued for.
///
/// Implementations may call out to a remote token service; the gate only
/// needs the resulting [`AuthPayload`].
#[async_trait]
pub trait TokenDecoder: Send + Sync {
    /// Identity carried by `token`.
    async fn decode(&self, token: &str) -> Result<AuthPayload, TokenError>;
}

/// Encode claims into a JWT token.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::from)
}

/// Decode and validate a JWT token.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// HS256 decoder sharing a secret with the issuer.
pub struct JwtTokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenDecoder {
    /// Decoder verifying HS256 signatures made with `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Decoder using the configured JWT secret.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }
}

#[async_trait]
impl TokenDecoder for JwtTokenDecoder {
    async fn decode(&self, token: &str) -> Result<AuthPayload, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::Invalid("missing subject".into()));
        }
        Ok(AuthPayload::new(claims.sub))
    }
}

/// Issue a token for `user_id` using the configured secret and lifetime.
pub fn issue_token(user_id: &str, config: &AuthConfig) -> Result<String, TokenError> {
    let expires_in = i64::try_from(config.token_expiry_secs).unwrap_or(i64::MAX / 2);
    encode_token(&Claims::new(user_id, expires_in), &config.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_32_chars_long!!!";

    #[test]
    fn test_encode_decode_roundtrip() {
        let claims = Claims::new("user-1", 3600);

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_wrong_secret() {
        let token = encode_token(&Claims::new("user-1", 3600), SECRET).unwrap();
        let result = decode_token(&token, "another_secret_key_32_chars_long");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token() {
        let token = encode_token(&Claims::new("user-1", -3600), SECRET).unwrap();
        assert_eq!(decode_token(&token, SECRET), Err(TokenError::Expired));
    }

    #[tokio::test]
    async fn test_decoder_yields_payload() {
        let config = AuthConfig {
            jwt_secret: SECRET.into(),
            token_expiry_secs: 600,
        };
        let token = issue_token("user-9", &config).unwrap();

        let decoder = JwtTokenDecoder::from_config(&config);
        assert_eq!(decoder.decode(&token).await.unwrap(), AuthPayload::new("user-9"));
        assert!(decoder.decode("garbage").await.is_err());
    }

    #[tokio::test]
    async fn test_decoder_rejects_empty_subject() {
        let token = encode_token(&Claims::new("", 3600), SECRET).unwrap();
        let result = JwtTokenDecoder::new(SECRET).decode(&token).await;
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}

//! Bearer-token authentication.

pub mod extractor;
pub mod jwt;
pub mod layer;
pub mod types;

pub use extractor::{Auth, MaybeAuth};
pub use jwt::{decode_token, encode_token, issue_token, JwtTokenDecoder, TokenDecoder, TokenError};
pub use layer::{extract_token, AuthLayer, AuthMiddleware};
pub use types::{request_with_user, with_auth_payload, AuthContextExt, AuthPayload, Claims};

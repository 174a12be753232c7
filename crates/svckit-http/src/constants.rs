//! Shared header names, cache key bases and defaults.

/// `Content-Type` header.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// `User-Agent` header.
pub const HEADER_USER_AGENT: &str = "User-Agent";
/// Bearer token sent by the client.
pub const HEADER_AUTHORIZATION: &str = "Authorization";
/// Customer token forwarded between services.
pub const HEADER_AUTHORIZATION_CUSTOMER: &str = "Authorization-Customer";
/// Bearer token set by the gateway; wins over `Authorization`.
pub const HEADER_X_FORWARDED_AUTHORIZATION: &str = "X-Forwarded-Authorization";
/// Caller identity forwarded between services.
pub const HEADER_X_USER_ID: &str = "X-User-Id";

/// Cache key base for order lookups.
pub const ORDER_CACHE_KEY: &str = "order";
/// Cache key base for book lookups.
pub const BOOK_CACHE_KEY: &str = "book";

/// `chrono` format for timestamps exchanged as plain strings.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Page size used when a list request does not specify one.
pub const DEFAULT_LIMIT: i64 = 30;

//! HTTP service toolkit.
//!
//! Building blocks shared by the order and book services:
//!
//! - **cache**: JSON cache facade over Redis (or an in-process store) with
//!   read-through `get_or_set` and prefix invalidation
//! - **middleware**: bearer-token auth gate and identity extractors
//! - **error**: `ApiError` and its single HTTP rendering
//! - **request**: body validation and path/query parameter parsing
//! - **config**: layered configuration loading
//!
//! Logging goes through `svckit-common-log`; components receive a
//! [`Logger`](svckit_common_log::Logger) at construction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod middleware;
pub mod request;

pub use cache::{CacheError, CacheService, CacheStore, MemoryStore, RedisStore};
pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use middleware::{AuthContextExt, AuthLayer, AuthPayload};

//! Caching layer.
//!
//! [`CacheService`] is the typed facade handlers use. It sits on a
//! [`CacheStore`]: [`RedisStore`] in production, [`MemoryStore`] in tests
//! and local runs.

pub mod r#trait;
pub mod memory;
pub mod redis;
pub mod helpers;
pub mod service;
pub mod value;

pub use r#trait::{CacheError, CacheResult, CacheStore, Ttl};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use helpers::*;
pub use service::CacheService;
pub use value::CacheValue;

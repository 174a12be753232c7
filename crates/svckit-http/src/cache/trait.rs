//! Cache store contract.

use async_trait::async_trait;
use std::time::Duration;
use svckit_common_log::LoggableError;

/// Cache operation result.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The key does not exist or has expired.
    #[error("Entry not found")]
    NotFound,
    /// The value could not be serialized.
    #[error("Encode error: {0}")]
    Encode(String),
    /// The stored bytes do not decode into the requested type.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The store rejected the command.
    #[error("Backend error: {0}")]
    Backend(String),
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl CacheError {
    /// A miss, as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Failure reaching or talking to the backing store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Connection(_))
    }
}

impl LoggableError for CacheError {
    fn is_absence(&self) -> bool {
        self.is_not_found()
    }
}

/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key does not exist.
    Missing,
    /// The key exists without an expiry.
    Persistent,
    /// The key expires after the given duration.
    Expires(Duration),
}

impl Ttl {
    /// Duration left, if the key expires.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Expires(d) => Some(*d),
            _ => None,
        }
    }

    /// Interpret a Redis `PTTL` reply.
    pub fn from_millis_reply(reply: i64) -> Self {
        match reply {
            -2 => Self::Missing,
            r if r < 0 => Self::Persistent,
            r => Self::Expires(Duration::from_millis(r as u64)),
        }
    }
}

/// Key-value backend behind the cache facade.
///
/// Values are opaque bytes. Each call is independently atomic at the store
/// level; nothing spans several keys.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Raw bytes stored under `key`, or [`CacheError::NotFound`].
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;

    /// Store bytes under `key`. A zero `ttl` stores without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Delete keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// One page of keys matching a glob `pattern`.
    ///
    /// Start with cursor `0`; iteration is done when the returned cursor is
    /// `0` again. A `count` of `0` lets the backend pick the page size.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<(Vec<String>, u64)>;

    /// Increment the integer stored under `key`, creating it at zero first.
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// Set an expiry on an existing key. Returns `false` if it does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> CacheResult<Ttl>;
}

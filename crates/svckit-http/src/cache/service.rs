//! Typed cache facade.

use super::helpers::{build_prefix_key, escape_glob};
use super::r#trait::{CacheError, CacheResult, CacheStore, Ttl};
use super::value::CacheValue;
use crate::config::CacheConfig;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use svckit_common_log::Logger;
use tracing::{debug, error, info, warn};

/// JSON cache over a [`CacheStore`].
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
    scan_count: usize,
    log: Logger,
}

impl CacheService {
    /// Create a facade over `store` using the TTL and scan settings from `config`.
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig, log: Logger) -> Self {
        Self {
            store,
            default_ttl: config.default_ttl(),
            scan_count: config.scan_count,
            log,
        }
    }

    /// TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Fetch and decode the value stored under `key`.
    ///
    /// A missing key yields [`CacheError::NotFound`], an undecodable payload
    /// [`CacheError::Decode`].
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(CacheError::NotFound) => {
                debug!(parent: self.log.span(), key = key, "cache miss");
                return Err(CacheError::NotFound);
            }
            Err(err) => {
                error!(parent: self.log.span(), key = key, error = %err, "failed when getting cache");
                return Err(err);
            }
        };

        let value = serde_json::from_slice(&raw).map_err(|e| {
            warn!(parent: self.log.span(), key = key, error = %e, "failed when decoding cached data");
            CacheError::Decode(e.to_string())
        })?;

        info!(parent: self.log.span(), key = key, "get data from cache");
        Ok(value)
    }

    /// Encode and store `data` under `key`.
    ///
    /// Empty values (see [`CacheValue::is_empty_value`]) are skipped and
    /// report success. Without a `ttl` the configured default applies.
    pub async fn set<T: CacheValue + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        if data.is_empty_value() {
            info!(parent: self.log.span(), key = key, "no data to save, value is empty");
            return Ok(());
        }

        let payload = serde_json::to_vec(data).map_err(|e| CacheError::Encode(e.to_string()))?;
        let ttl = ttl.unwrap_or(self.default_ttl);

        if let Err(err) = self.store.set(key, payload, ttl).await {
            error!(parent: self.log.span(), key = key, error = %err, "failed when setting cache");
            return Err(err);
        }

        info!(parent: self.log.span(), key = key, ttl_secs = ttl.as_secs(), "set data to cache");
        Ok(())
    }

    /// Read-through helper.
    ///
    /// Returns the cached value on a hit. On a miss, runs `compute`, stores its
    /// result and returns it. Any other read failure is returned without
    /// running `compute`.
    ///
    /// Concurrent misses on the same key are not coalesced: each caller
    /// computes and writes on its own.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T, E>
    where
        T: CacheValue + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let value = compute().await?;
        self.set(key, &value, ttl).await?;
        Ok(value)
    }

    /// Delete a single key.
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        if let Err(err) = self.store.delete(&[key.to_string()]).await {
            error!(parent: self.log.span(), key = key, error = %err, "failed when deleting cache");
            return Err(err);
        }
        Ok(())
    }

    /// Delete every key starting with `prefix`.
    ///
    /// Best effort: a failing scan is logged and ends the sweep. Returns the
    /// number of entries removed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> u64 {
        let (deleted, _) = self.purge_prefix(prefix).await;
        deleted
    }

    /// Invalidate the entries of several logical keys at once.
    ///
    /// Each key is combined with `identifier` (when non-empty) into a prefix,
    /// and all prefixes are purged concurrently. A failure on one prefix does
    /// not stop the others; the first failure is logged. Returns the total
    /// number of entries removed.
    pub async fn clear_caches(&self, keys: &[&str], identifier: &str) -> u64 {
        let purges = keys.iter().map(|key| {
            let prefix = build_prefix_key(&[*key, identifier]);
            async move { self.purge_prefix(&prefix).await }
        });

        let mut total = 0;
        let mut first_error = None;
        for (deleted, result) in join_all(purges).await {
            total += deleted;
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        let outcome: CacheResult<()> = first_error.map_or(Ok(()), Err);
        self.log.log_if_error(&outcome, Some("failed when clearing caches"));
        total
    }

    /// Increment the counter stored under `key`.
    pub async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.store.incr(key).await
    }

    /// Set an expiry on `key`. Returns `false` when the key does not exist.
    pub async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        self.store.expire(key, ttl).await
    }

    /// Remaining lifetime of `key`.
    pub async fn ttl(&self, key: &str) -> CacheResult<Ttl> {
        self.store.ttl(key).await
    }

    async fn purge_prefix(&self, prefix: &str) -> (u64, CacheResult<()>) {
        let pattern = format!("{}*", escape_glob(prefix));
        debug!(parent: self.log.span(), pattern = %pattern, "deleting cache by prefix");

        let mut cursor = 0;
        let mut deleted = 0;
        loop {
            let (keys, next) = match self.store.scan(cursor, &pattern, self.scan_count).await {
                Ok(page) => page,
                Err(err) => {
                    error!(parent: self.log.span(), prefix = prefix, error = %err, "failed when scanning cache");
                    return (deleted, Err(err));
                }
            };

            if !keys.is_empty() {
                match self.store.delete(&keys).await {
                    Ok(count) => {
                        debug!(parent: self.log.span(), keys = ?keys, "deleted cache entries");
                        deleted += count;
                    }
                    Err(err) => {
                        warn!(parent: self.log.span(), prefix = prefix, error = %err, "failed when deleting cache");
                    }
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!(parent: self.log.span(), prefix = prefix, deleted = deleted, "deleted cache by prefix");
        (deleted, Ok(()))
    }
}

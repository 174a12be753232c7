//! Redis cache store.

use super::r#trait::{CacheError, CacheResult, CacheStore, Ttl};
use crate::config::CacheConfig;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::IntoConnectionInfo;
use std::time::Duration;
use tracing::debug;

const DEFAULT_REDIS_PORT: u16 = 6379;

/// Redis-backed [`CacheStore`].
///
/// Clones share one multiplexed connection that reconnects on its own, so a
/// single store can serve every request task.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect using the address and credentials from the cache configuration.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let (host, port) = split_host(&config.redis_host)?;

        let mut info = (host, port)
            .into_connection_info()
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        info.redis.db = config.redis_db;
        info.redis.username = config.redis_username.clone().filter(|u| !u.is_empty());
        info.redis.password = config.redis_password.clone().filter(|p| !p.is_empty());

        let client = redis::Client::open(info).map_err(|e| CacheError::Connection(e.to_string()))?;
        Self::from_client(client).await
    }

    /// Connect to a `redis://` URL.
    pub async fn open(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        Self::from_client(client).await
    }

    async fn from_client(client: redis::Client) -> CacheResult<Self> {
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

fn split_host(addr: &str) -> CacheResult<(String, u16)> {
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| CacheError::Connection(format!("invalid redis port in '{}'", addr)))?;
            Ok((host.to_string(), port))
        }
        None => Ok((addr.to_string(), DEFAULT_REDIS_PORT)),
    }
}

fn backend(err: redis::RedisError) -> CacheError {
    if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Backend(err.to_string())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let mut conn = self.connection();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;

        value.ok_or(CacheError::NotFound)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if !ttl.is_zero() {
            cmd.arg("PX").arg(ttl.as_millis().max(1) as u64);
        }

        cmd.query_async::<_, ()>(&mut conn).await.map_err(backend)?;
        debug!(key = key, ttl_ms = ttl.as_millis() as u64, "Redis set");
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection();
        redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(backend)
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<(Vec<String>, u64)> {
        let mut conn = self.connection();
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor).arg("MATCH").arg(pattern);
        if count > 0 {
            cmd.arg("COUNT").arg(count);
        }

        let (next, keys): (u64, Vec<String>) = cmd.query_async(&mut conn).await.map_err(backend)?;
        Ok((keys, next))
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.connection();
        redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.connection();
        redis::cmd("PEXPIRE")
            .arg(key)
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(backend)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Ttl> {
        let mut conn = self.connection();
        let reply: i64 = redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;

        Ok(Ttl::from_millis_reply(reply))
    }
}

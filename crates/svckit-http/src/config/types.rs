//! Service configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use svckit_common_log::{LogConfig, LogFormat, LogLevel};

/// Main service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Redis connection and cache behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis address as `host:port`.
    #[serde(default = "default_redis_host")]
    pub redis_host: String,
    /// ACL username.
    #[serde(default)]
    pub redis_username: Option<String>,
    /// Password.
    #[serde(default)]
    pub redis_password: Option<String>,
    /// Logical database index.
    #[serde(default)]
    pub redis_db: i64,
    /// TTL applied when a write does not carry one.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Page size hint for prefix scans. `0` lets the backend decide.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
}

fn default_redis_host() -> String {
    "localhost:6379".to_string()
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_scan_count() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_host: default_redis_host(),
            redis_username: None,
            redis_password: None,
            redis_db: 0,
            default_ttl_secs: default_ttl_secs(),
            scan_count: default_scan_count(),
        }
    }
}

impl CacheConfig {
    /// Default TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Authentication configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret.
    #[serde(default)]
    pub jwt_secret: String,
    /// Lifetime of tokens issued by `issue_token`.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (`pretty`, `compact` or `json`).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional log file.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Include file and line in events.
    #[serde(default)]
    pub source_location: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file_path: None,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Settings for [`svckit_common_log::init`]. Unknown levels fall back to info.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: LogLevel::parse(&self.level).unwrap_or_default(),
            format: LogFormat::parse(&self.format),
            file_path: self.file_path.clone(),
            source_location: self.source_location,
            span_events: false,
        }
    }
}

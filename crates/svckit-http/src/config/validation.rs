//! Configuration validation.

use super::types::ServiceConfig;
use svckit_common_log::LogLevel;
use thiserror::Error;

/// A configuration problem found by [`validate_config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JWT secret is shorter than 32 characters.
    #[error("Invalid JWT secret: must be at least 32 characters")]
    InvalidJwtSecret,

    /// No Redis address was configured.
    #[error("Redis host must not be empty")]
    MissingRedisHost,

    /// The default TTL is zero.
    #[error("Default cache TTL must be greater than zero")]
    InvalidDefaultTtl,

    /// The log level is not one of trace, debug, info, warn or error.
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Validate service configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.len() < 32 {
        errors.push(ConfigError::InvalidJwtSecret);
    }

    if config.cache.redis_host.trim().is_empty() {
        errors.push(ConfigError::MissingRedisHost);
    }

    if config.cache.default_ttl_secs == 0 {
        errors.push(ConfigError::InvalidDefaultTtl);
    }

    if LogLevel::parse(&config.logging.level).is_none() {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

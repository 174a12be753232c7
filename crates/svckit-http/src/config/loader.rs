//! Configuration loading utilities.

use super::types::ServiceConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Load configuration from embedded defaults, an optional file and the environment.
///
/// Environment variables use the prefix followed by `_`, with `__` between
/// nested keys: `SVCKIT_CACHE__REDIS_HOST`.
pub struct ConfigLoader {
    config_path: Option<String>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader with no file and the `SVCKIT` prefix.
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "SVCKIT".to_string(),
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServiceConfig> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "loading config file");
                builder = builder.add_source(config::File::from(Path::new(path)));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("failed to build configuration")?;

        config
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration, reading `.env` first and `CONFIG_PATH` for the file.
pub fn load_config() -> Result<ServiceConfig> {
    dotenvy::dotenv().ok();

    let mut loader = ConfigLoader::new();
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        loader = loader.with_config_path(path);
    }

    loader.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults() {
        let config = ConfigLoader::new()
            .with_env_prefix("SVCKIT_TEST_DEFAULTS")
            .load()
            .unwrap();

        assert_eq!(config.cache.redis_host, "localhost:6379");
        assert_eq!(config.cache.default_ttl_secs, 300);
        assert_eq!(config.logging.level, "info");
        assert!(config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cache]\nredis_host = \"redis:6380\"\ndefault_ttl_secs = 60\n\n[auth]\njwt_secret = \"{}\"",
            "k".repeat(32)
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_config_path(file.path().to_string_lossy())
            .with_env_prefix("SVCKIT_TEST_FILE")
            .load()
            .unwrap();

        assert_eq!(config.cache.redis_host, "redis:6380");
        assert_eq!(config.cache.default_ttl_secs, 60);
        assert_eq!(config.cache.scan_count, 100);
        assert_eq!(config.auth.jwt_secret.len(), 32);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = ConfigLoader::new()
            .with_config_path("/nonexistent/svckit.toml")
            .with_env_prefix("SVCKIT_TEST_MISSING")
            .load()
            .unwrap();

        assert_eq!(config.cache.redis_db, 0);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("SVCKIT_TEST_ENV_CACHE__REDIS_DB", "3");
        std::env::set_var("SVCKIT_TEST_ENV_LOGGING__LEVEL", "debug");

        let config = ConfigLoader::new()
            .with_env_prefix("SVCKIT_TEST_ENV")
            .load()
            .unwrap();

        std::env::remove_var("SVCKIT_TEST_ENV_CACHE__REDIS_DB");
        std::env::remove_var("SVCKIT_TEST_ENV_LOGGING__LEVEL");

        assert_eq!(config.cache.redis_db, 3);
        assert_eq!(config.logging.level, "debug");
    }
}

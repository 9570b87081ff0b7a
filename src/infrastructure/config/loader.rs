use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database URL cannot be empty")]
    EmptyDatabaseUrl,

    #[error("Invalid max_staleness_minutes: {0}. Must be at least 1")]
    InvalidStaleness(u64),

    #[error("Invalid cache TTL: {0}. Must be positive")]
    InvalidTtl(u64),

    #[error(
        "Invalid TTL ordering: listing_ttl_seconds ({0}) must not exceed aggregate_ttl_seconds ({1})"
    )]
    InvalidTtlOrdering(u64, u64),

    #[error("Invalid cache max_entries: {0}. Must be at least 1")]
    InvalidMaxEntries(u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vitrine/config.yaml (project config)
    /// 3. .vitrine/local.yaml (local overrides, optional)
    /// 4. Environment variables (VITRINE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vitrine/config.yaml"))
            .merge(Yaml::file(".vitrine/local.yaml"))
            .merge(Env::prefixed("VITRINE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.url.is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        if config.snapshot.max_staleness_minutes == 0 {
            return Err(ConfigError::InvalidStaleness(
                config.snapshot.max_staleness_minutes,
            ));
        }

        let cache = &config.cache;
        for ttl in [
            cache.listing_ttl_seconds,
            cache.item_ttl_seconds,
            cache.aggregate_ttl_seconds,
        ] {
            if ttl == 0 {
                return Err(ConfigError::InvalidTtl(ttl));
            }
        }
        if cache.listing_ttl_seconds > cache.aggregate_ttl_seconds {
            return Err(ConfigError::InvalidTtlOrdering(
                cache.listing_ttl_seconds,
                cache.aggregate_ttl_seconds,
            ));
        }
        if cache.max_entries == 0 {
            return Err(ConfigError::InvalidMaxEntries(cache.max_entries));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
        match config.logging.format.as_str() {
            "json" | "pretty" => {}
            other => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        }

        Ok(())
    }
}

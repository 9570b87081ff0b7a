//! Configuration model.
//!
//! Loaded by `infrastructure::config::ConfigLoader` with hierarchical merging
//! (programmatic defaults, then YAML files, then `VITRINE_*` environment
//! variables).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub snapshot: SnapshotConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database URL (e.g. "sqlite:.vitrine/catalog.db" or
    /// "sqlite::memory:").
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:.vitrine/catalog.db".to_string(),
        }
    }
}

/// Snapshot staleness policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Maximum snapshot age before a read triggers a refresh.
    pub max_staleness_minutes: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        // 24 hours; writes force-refresh well before this in practice.
        Self {
            max_staleness_minutes: 24 * 60,
        }
    }
}

impl SnapshotConfig {
    pub fn max_staleness(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::try_from(self.max_staleness_minutes).unwrap_or(i64::MAX))
    }
}

/// Query-result cache TTL and capacity policy.
///
/// Paginated listing results get a minutes-scale TTL; low-churn aggregates
/// (per-category counts, total count) get an hours-scale TTL since they are
/// explicitly invalidated on write rather than relied upon to expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub listing_ttl_seconds: u64,
    pub item_ttl_seconds: u64,
    pub aggregate_ttl_seconds: u64,
    /// Bound on result-cache cardinality; the backend evicts beyond this.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_ttl_seconds: 5 * 60,
            item_ttl_seconds: 60 * 60,
            aggregate_ttl_seconds: 6 * 60 * 60,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn listing_ttl(&self) -> Duration {
        Duration::from_secs(self.listing_ttl_seconds)
    }

    pub fn item_ttl(&self) -> Duration {
        Duration::from_secs(self.item_ttl_seconds)
    }

    pub fn aggregate_ttl(&self) -> Duration {
        Duration::from_secs(self.aggregate_ttl_seconds)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    pub level: String,
    /// json | pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

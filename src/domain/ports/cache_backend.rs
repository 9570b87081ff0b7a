//! Distributed cache backend port.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::domain::errors::DomainResult;

/// Key-value cache collaborator with per-key TTL.
///
/// Values are serialized JSON documents (cached page responses and derived
/// aggregates). Implementations must treat backend failures as recoverable:
/// callers degrade a failed `get` to a cache miss and a failed `set`/`delete`
/// to a logged no-op, never a request error.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value; `None` on miss or expiry.
    async fn get(&self, key: &str) -> DomainResult<Option<Value>>;

    /// Store a value under `key` with the given TTL.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> DomainResult<()>;

    /// Delete a single key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> DomainResult<()>;

    /// Delete every key matching a glob pattern (`prefix:*`).
    ///
    /// Returns the number of keys scheduled for removal where the backend can
    /// report it. Kept for wildcard purges of whole namespaces; targeted
    /// invalidation goes through the tag index instead.
    async fn delete_by_pattern(&self, pattern: &str) -> DomainResult<u64>;
}

//! Moka-backed cache backend with per-entry TTL.
//!
//! Stands in for the distributed KV cache: per-key TTL via moka's `Expiry`
//! policy, bounded cardinality via `max_capacity` (TinyLFU admission with
//! LRU-ish eviction), and glob-pattern deletes by iterating live entries.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::domain::errors::DomainResult;
use crate::domain::ports::CacheBackend;

/// A cached value together with its own TTL.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    ttl: Duration,
}

/// Expiry policy reading each entry's own TTL.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process cache backend over `moka::future::Cache`.
pub struct MokaCacheBackend {
    cache: Cache<String, CacheEntry>,
}

impl MokaCacheBackend {
    /// Create a backend bounded to `max_entries` live entries.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of entries currently resident (approximate, per moka).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> DomainResult<()> {
        self.cache
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> DomainResult<u64> {
        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| (*key).clone())
            .collect();
        let count = matching.len() as u64;
        for key in matching {
            self.cache.invalidate(&key).await;
        }
        Ok(count)
    }
}

/// Minimal glob matching: `*` matches any run of characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn inner(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => inner(&p[1..], t) || (!t.is_empty() && inner(p, &t[1..])),
            (Some(pc), Some(tc)) if pc == tc => inner(&p[1..], &t[1..]),
            _ => false,
        }
    }
    inner(pattern.as_bytes(), text.as_bytes())
}

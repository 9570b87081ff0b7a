//! Query-result cache: signature-keyed read-through storage with a reverse
//! tag index for precise invalidation.
//!
//! Instead of glob-scanning the whole result-cache namespace on every write,
//! each cached key registers a set of tags (e.g. `scope:listing`,
//! `category:Writing`); the invalidator purges by tag, touching only the keys
//! that are actually affected. The backend's pattern delete survives as a
//! fallback for whole-namespace purges.
//!
//! Every backend failure degrades: a failed `get` is a miss, a failed `set`
//! or `delete` is a logged no-op. Cache trouble is never a request error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::models::CacheConfig;
use crate::domain::ports::CacheBackend;

/// TTL policy: minutes-scale for paginated listing results, hours-scale for
/// single items and low-churn aggregates (those are explicitly invalidated on
/// write rather than relied upon to expire).
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub listing: Duration,
    pub item: Duration,
    pub aggregate: Duration,
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            listing: config.listing_ttl(),
            item: config.item_ttl(),
            aggregate: config.aggregate_ttl(),
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        (&CacheConfig::default()).into()
    }
}

/// Reverse tag index: tag -> keys and key -> tags.
///
/// Both directions are kept so that purging a tag can drop the purged keys
/// from every other tag set without a full scan.
///
/// The index is capped: the backend expires and evicts entries on its own,
/// so without a cap of its own the index would keep one record per distinct
/// signature ever cached. When the cap is hit the oldest registration is
/// dropped. Dropping a record for a key the backend still holds only costs
/// tag-purge precision for that one key; its cached value stays readable
/// until its TTL runs out.
#[derive(Debug)]
struct TagIndex {
    by_tag: HashMap<String, HashSet<String>>,
    by_key: HashMap<String, KeyRecord>,
    // FIFO of (seq, key) registrations; removed keys leave stale records
    // behind, skipped on pop by comparing seq against the live record.
    order: VecDeque<(u64, String)>,
    capacity: usize,
    next_seq: u64,
}

#[derive(Debug)]
struct KeyRecord {
    tags: HashSet<String>,
    seq: u64,
}

impl TagIndex {
    fn new(capacity: usize) -> Self {
        Self {
            by_tag: HashMap::new(),
            by_key: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    fn insert(&mut self, key: &str, tags: &[String]) {
        self.remove_key(key);
        for tag in tags {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_key.insert(
            key.to_string(),
            KeyRecord {
                tags: tags.iter().cloned().collect(),
                seq,
            },
        );
        self.order.push_back((seq, key.to_string()));
        self.evict_over_capacity();
    }

    fn evict_over_capacity(&mut self) {
        while self.by_key.len() > self.capacity {
            let Some((seq, key)) = self.order.pop_front() else {
                break;
            };
            // Stale record: the key was purged or re-registered since.
            if self.by_key.get(&key).is_some_and(|record| record.seq == seq) {
                self.remove_key(&key);
            }
        }
    }

    fn remove_key(&mut self, key: &str) {
        if let Some(record) = self.by_key.remove(key) {
            for tag in record.tags {
                if let Some(keys) = self.by_tag.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.by_tag.remove(&tag);
                    }
                }
            }
        }
    }

    fn take_tag(&mut self, tag: &str) -> Vec<String> {
        let keys: Vec<String> = self
            .by_tag
            .remove(tag)
            .map(|keys| keys.into_iter().collect())
            .unwrap_or_default();
        for key in &keys {
            self.remove_key(key);
        }
        keys
    }

    fn tracked_keys(&self) -> usize {
        self.by_key.len()
    }
}

/// Read-through cache for computed query results and derived aggregates.
pub struct QueryResultCache {
    backend: Arc<dyn CacheBackend>,
    tags: Mutex<TagIndex>,
    policy: TtlPolicy,
}

impl QueryResultCache {
    /// `max_tracked_keys` bounds the tag index; it normally matches the
    /// backend's own entry cap.
    pub fn new(backend: Arc<dyn CacheBackend>, policy: TtlPolicy, max_tracked_keys: u64) -> Self {
        let capacity = usize::try_from(max_tracked_keys).unwrap_or(usize::MAX);
        Self {
            backend,
            tags: Mutex::new(TagIndex::new(capacity)),
            policy,
        }
    }

    pub fn policy(&self) -> TtlPolicy {
        self.policy
    }

    /// Cache key for a single-item entry.
    pub fn item_key(id: &str) -> String {
        format!("item:{id}")
    }

    /// Cache key for a per-category aggregate.
    pub fn category_key(category: &str) -> String {
        format!("agg:category:{category}")
    }

    /// Cache key for the global count aggregate.
    pub fn total_key() -> String {
        "agg:total".to_string()
    }

    /// Fetch and deserialize; backend failure or a corrupt entry degrades to
    /// a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(key, error = %err, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Serialize and store under `key`, registering invalidation tags.
    /// Failures are logged and swallowed.
    pub async fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        tags: &[String],
    ) {
        let encoded = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "failed to serialize cache value");
                return;
            }
        };
        if let Err(err) = self.backend.set(key, encoded, ttl).await {
            warn!(key, error = %err, "cache set failed, skipping");
            return;
        }
        self.tags.lock().await.insert(key, tags);
        debug!(key, ttl_secs = ttl.as_secs(), "cached query result");
    }

    /// Delete a single key, best-effort. Returns true if the delete call
    /// succeeded (including deleting an absent key).
    pub async fn purge_key(&self, key: &str) -> bool {
        self.tags.lock().await.remove_key(key);
        match self.backend.delete(key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "cache delete failed");
                false
            }
        }
    }

    /// Delete every key registered under `tag`. Returns the number of keys
    /// purged. O(affected keys), not O(cache size).
    pub async fn purge_tag(&self, tag: &str) -> u64 {
        let keys = self.tags.lock().await.take_tag(tag);
        let mut purged = 0;
        for key in keys {
            match self.backend.delete(&key).await {
                Ok(()) => purged += 1,
                Err(err) => warn!(key, error = %err, "cache delete failed during tag purge"),
            }
        }
        if purged > 0 {
            debug!(tag, purged, "purged cache tag");
        }
        purged
    }

    /// Wildcard fallback: delete every key matching `pattern` directly on the
    /// backend. Used for whole-namespace purges where the tag index would be
    /// equivalent anyway.
    pub async fn purge_pattern(&self, pattern: &str) -> u64 {
        match self.backend.delete_by_pattern(pattern).await {
            Ok(n) => n,
            Err(err) => {
                warn!(pattern, error = %err, "pattern purge failed");
                0
            }
        }
    }

    /// Number of keys currently tracked by the tag index.
    pub async fn tracked_keys(&self) -> usize {
        self.tags.lock().await.tracked_keys()
    }
}

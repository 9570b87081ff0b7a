//! Snapshot manager: the authoritative in-memory view of one collection.
//!
//! The current snapshot lives behind a single `ArcSwapOption` reference.
//! Readers capture the reference once per request and never observe a
//! mid-request swap; refreshes build a whole new snapshot and swap it in
//! atomically. Overlapping refreshes are allowed to race — whichever finishes
//! last wins. That trade-off is acceptable because correctness only requires
//! "no older than `max_staleness`", not strict serialization of refreshes.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Snapshot;
use crate::domain::ports::{CatalogStore, ListOrder};

/// Clock used to judge snapshot staleness; injectable for tests.
pub type ClockFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Holds the in-memory snapshot of one collection and decides when it must be
/// reloaded. Dependencies are constructor-injected; there is no module-level
/// global.
pub struct SnapshotManager {
    store: Arc<dyn CatalogStore>,
    current: ArcSwapOption<Snapshot>,
    max_staleness: chrono::Duration,
    clock: ClockFn,
}

impl SnapshotManager {
    pub fn new(store: Arc<dyn CatalogStore>, max_staleness: chrono::Duration) -> Self {
        Self::with_clock(store, max_staleness, Arc::new(Utc::now))
    }

    /// Create with an injected clock (test hook for staleness behavior).
    pub fn with_clock(
        store: Arc<dyn CatalogStore>,
        max_staleness: chrono::Duration,
        clock: ClockFn,
    ) -> Self {
        Self {
            store,
            current: ArcSwapOption::const_empty(),
            max_staleness,
            clock,
        }
    }

    /// The current snapshot reference, if one has been loaded.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Return the current snapshot if it is younger than the staleness
    /// window, refreshing otherwise.
    ///
    /// On refresh failure the previous snapshot (if any) remains authoritative
    /// and is served degraded; only when no snapshot has ever loaded does the
    /// failure surface to the caller.
    pub async fn ensure_fresh(&self) -> DomainResult<Arc<Snapshot>> {
        let now = (self.clock)();
        if let Some(snapshot) = self.current() {
            if snapshot.age(now) < self.max_staleness {
                return Ok(snapshot);
            }
            debug!(
                age_secs = snapshot.age(now).num_seconds(),
                "snapshot stale, refreshing"
            );
        }

        match self.refresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => match self.current() {
                Some(previous) => {
                    warn!(error = %err, "snapshot refresh failed, serving previous generation");
                    Ok(previous)
                }
                None => Err(DomainError::SnapshotUnavailable(err.to_string())),
            },
        }
    }

    /// Load the entire collection and atomically swap in the new snapshot.
    ///
    /// On load failure the previous snapshot is left untouched and the error
    /// is reported to the caller. An empty collection is a valid outcome.
    pub async fn refresh(&self) -> DomainResult<Arc<Snapshot>> {
        let items = self.store.list_all(ListOrder::CreatedDesc).await?;
        let snapshot = Arc::new(Snapshot::build(items, (self.clock)()));
        info!(item_count = snapshot.item_count(), "snapshot refreshed");
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Refresh regardless of staleness; used by the invalidator after every
    /// write and by the administrative refresh endpoint.
    pub async fn force_refresh(&self) -> DomainResult<Arc<Snapshot>> {
        self.refresh().await
    }

    /// Load-state statistics for the admin stats endpoint.
    pub fn stats(&self) -> SnapshotStats {
        let now = (self.clock)();
        match self.current() {
            Some(snapshot) => {
                let age = snapshot.age(now);
                SnapshotStats {
                    loaded: true,
                    item_count: snapshot.item_count(),
                    age_seconds: age.num_seconds().max(0),
                    next_refresh_in_seconds: (self.max_staleness - age).num_seconds().max(0),
                }
            }
            None => SnapshotStats {
                loaded: false,
                item_count: 0,
                age_seconds: 0,
                next_refresh_in_seconds: 0,
            },
        }
    }
}

/// Snapshot load state, age, and next-refresh countdown.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub loaded: bool,
    pub item_count: usize,
    pub age_seconds: i64,
    pub next_refresh_in_seconds: i64,
}

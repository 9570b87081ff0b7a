//! Write-triggered cache invalidation protocol.
//!
//! Every mutation refreshes the snapshot (the snapshot, not just the result
//! cache, holds listing-surfaced fields) and purges the affected cache
//! entries: the whole listing scope (any cached page could now be wrong), the
//! single-item entry, the per-category aggregates, and the global count.
//!
//! Invalidation is best-effort and idempotent: a failed purge or refresh is
//! logged and never fails the write — the document store is the source of
//! truth and the cache is allowed to stay transiently stale until the next
//! purge or TTL expiry.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::{CatalogItem, QuerySignature};
use crate::services::query_cache::QueryResultCache;
use crate::services::snapshot::SnapshotManager;

/// Orchestrates snapshot refresh plus targeted cache purges on every write.
pub struct Invalidator {
    snapshots: Arc<SnapshotManager>,
    cache: Arc<QueryResultCache>,
}

impl Invalidator {
    pub fn new(snapshots: Arc<SnapshotManager>, cache: Arc<QueryResultCache>) -> Self {
        Self { snapshots, cache }
    }

    /// A new item was created.
    pub async fn on_create(&self, item: &CatalogItem) {
        self.refresh_snapshot("create").await;
        self.purge_listings().await;
        self.purge_categories(item.categories.iter()).await;
        self.purge_total().await;
        info!(item_id = %item.id, "invalidated caches after create");
    }

    /// An existing item was updated. `old_categories` is the category set
    /// before the write; purging the union of old and new is simpler than the
    /// symmetric difference and always safe.
    pub async fn on_update(&self, old_categories: &[String], item: &CatalogItem) {
        self.refresh_snapshot("update").await;
        self.purge_listings().await;
        self.cache
            .purge_key(&QueryResultCache::item_key(&item.id))
            .await;
        self.purge_categories(old_categories.iter().chain(item.categories.iter()))
            .await;
        self.purge_total().await;
        info!(item_id = %item.id, "invalidated caches after update");
    }

    /// An item was deleted; `item` is its last stored state.
    pub async fn on_delete(&self, item: &CatalogItem) {
        self.refresh_snapshot("delete").await;
        self.purge_listings().await;
        self.cache
            .purge_key(&QueryResultCache::item_key(&item.id))
            .await;
        self.purge_categories(item.categories.iter()).await;
        self.purge_total().await;
        info!(item_id = %item.id, "invalidated caches after delete");
    }

    /// An engagement mutation (like toggle, counter increment, review) changed
    /// fields surfaced in listings.
    pub async fn on_engagement(&self, item_id: &str) {
        self.refresh_snapshot("engagement").await;
        self.purge_listings().await;
        self.cache
            .purge_key(&QueryResultCache::item_key(item_id))
            .await;
    }

    async fn refresh_snapshot(&self, trigger: &str) {
        if let Err(err) = self.snapshots.force_refresh().await {
            warn!(trigger, error = %err, "snapshot refresh after write failed");
        }
    }

    async fn purge_listings(&self) {
        self.cache.purge_tag(QuerySignature::LISTING_SCOPE).await;
    }

    async fn purge_categories<'a>(&self, categories: impl Iterator<Item = &'a String>) {
        // Deduplicate: update purges old ∪ new, which may overlap.
        let distinct: BTreeSet<&String> = categories.collect();
        for category in distinct {
            self.cache
                .purge_key(&QueryResultCache::category_key(category))
                .await;
            self.cache.purge_tag(&format!("category:{category}")).await;
        }
    }

    async fn purge_total(&self) {
        self.cache.purge_key(&QueryResultCache::total_key()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheBackend;
    use crate::domain::ports::{CatalogStore, MemoryCatalogStore};
    use crate::services::query_cache::TtlPolicy;
    use chrono::Utc;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryCatalogStore>,
        cache: Arc<QueryResultCache>,
        invalidator: Invalidator,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryCatalogStore::new());
        let snapshots = Arc::new(SnapshotManager::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            chrono::Duration::hours(1),
        ));
        let cache = Arc::new(QueryResultCache::new(
            Arc::new(MokaCacheBackend::new(1_000)),
            TtlPolicy::default(),
            1_000,
        ));
        let invalidator = Invalidator::new(snapshots, Arc::clone(&cache));
        Fixture {
            store,
            cache,
            invalidator,
        }
    }

    fn item(id: &str, categories: &[&str]) -> CatalogItem {
        let mut item = CatalogItem::new(id, Utc::now());
        item.categories = categories.iter().map(|c| (*c).to_string()).collect();
        item.normalize_categories();
        item
    }

    async fn seed_cache(cache: &QueryResultCache) {
        cache
            .put_json(
                "listing:sig-a",
                &1,
                Duration::from_secs(300),
                &[QuerySignature::LISTING_SCOPE.to_string()],
            )
            .await;
        cache
            .put_json(&QueryResultCache::item_key("x"), &2, Duration::from_secs(300), &[])
            .await;
        cache
            .put_json(
                &QueryResultCache::category_key("Tools"),
                &3,
                Duration::from_secs(300),
                &[],
            )
            .await;
        cache
            .put_json(&QueryResultCache::total_key(), &4, Duration::from_secs(300), &[])
            .await;
    }

    #[tokio::test]
    async fn test_on_create_purges_listing_scope_and_aggregates() {
        let f = fixture().await;
        seed_cache(&f.cache).await;

        let new = item("x", &["Tools"]);
        f.store.create(&new).await.unwrap();
        f.invalidator.on_create(&new).await;

        assert_eq!(f.cache.get_json::<i32>("listing:sig-a").await, None);
        assert_eq!(
            f.cache
                .get_json::<i32>(&QueryResultCache::category_key("Tools"))
                .await,
            None
        );
        assert_eq!(
            f.cache.get_json::<i32>(&QueryResultCache::total_key()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_on_update_purges_old_and_new_categories() {
        let f = fixture().await;
        let old = item("x", &["Tools"]);
        f.store.create(&old).await.unwrap();

        f.cache
            .put_json(
                &QueryResultCache::category_key("Business"),
                &1,
                Duration::from_secs(300),
                &[],
            )
            .await;
        seed_cache(&f.cache).await;

        let mut updated = old.clone();
        updated.categories = vec!["Business".to_string()];
        updated.category = None;
        updated.normalize_categories();
        f.store.update("x", &updated).await.unwrap();

        f.invalidator.on_update(&old.categories, &updated).await;

        assert_eq!(
            f.cache
                .get_json::<i32>(&QueryResultCache::category_key("Tools"))
                .await,
            None
        );
        assert_eq!(
            f.cache
                .get_json::<i32>(&QueryResultCache::category_key("Business"))
                .await,
            None
        );
        assert_eq!(
            f.cache
                .get_json::<i32>(&QueryResultCache::item_key("x"))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_on_update_is_idempotent() {
        let f = fixture().await;
        let stored = item("x", &["Tools"]);
        f.store.create(&stored).await.unwrap();
        seed_cache(&f.cache).await;

        f.invalidator.on_update(&stored.categories, &stored).await;
        let tracked_after_once = f.cache.tracked_keys().await;
        f.invalidator.on_update(&stored.categories, &stored).await;
        assert_eq!(f.cache.tracked_keys().await, tracked_after_once);
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_panic_or_propagate() {
        let f = fixture().await;
        let stored = item("x", &["Tools"]);
        f.store.create(&stored).await.unwrap();
        f.store.set_failing(true);
        // Must complete despite the store outage; invalidation is best-effort.
        f.invalidator.on_engagement("x").await;
    }
}

//! Write-path service: normalize, persist, invalidate.
//!
//! The document store is the source of truth; a write is only reported
//! successful once the store acknowledges it. Invalidation then runs
//! synchronously but best-effort — store failures are the only user-visible
//! errors on this path.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CatalogItem, ItemDraft};
use crate::domain::ports::{CatalogStore, CounterField};
use crate::services::invalidator::Invalidator;
use crate::services::snapshot::ClockFn;

/// Catalog mutations with write-triggered cache invalidation.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    invalidator: Arc<Invalidator>,
    clock: ClockFn,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, invalidator: Arc<Invalidator>) -> Self {
        Self::with_clock(store, invalidator, Arc::new(Utc::now))
    }

    pub fn with_clock(
        store: Arc<dyn CatalogStore>,
        invalidator: Arc<Invalidator>,
        clock: ClockFn,
    ) -> Self {
        Self {
            store,
            invalidator,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Create a new item from a normalized draft. Returns the stored item.
    pub async fn create(&self, draft: ItemDraft) -> DomainResult<CatalogItem> {
        draft.validate_for_create()?;
        let item = draft.into_item(Uuid::new_v4().to_string(), self.now());
        self.store.create(&item).await?;
        info!(item_id = %item.id, "item created");
        self.invalidator.on_create(&item).await;
        Ok(item)
    }

    /// Merge a draft into the stored item and persist the result.
    pub async fn update(&self, id: &str, draft: ItemDraft) -> DomainResult<CatalogItem> {
        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))?;
        let old_categories = existing.categories.clone();

        let updated = draft.merged_into(&existing, self.now());
        self.store.update(id, &updated).await?;
        info!(item_id = %id, "item updated");
        self.invalidator.on_update(&old_categories, &updated).await;
        Ok(updated)
    }

    /// Delete an item.
    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))?;
        self.store.delete(id).await?;
        info!(item_id = %id, "item deleted");
        self.invalidator.on_delete(&existing).await;
        Ok(())
    }

    /// Toggle a like for `user_id`. Returns true if the item is now liked.
    pub async fn toggle_like(&self, id: &str, user_id: &str) -> DomainResult<bool> {
        let mut item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))?;
        let liked = item.toggle_like(user_id);
        item.updated_at = self.now();
        self.store.update(id, &item).await?;
        self.invalidator.on_engagement(id).await;
        Ok(liked)
    }

    /// Record a view via the store's atomic counter increment.
    pub async fn record_view(&self, id: &str) -> DomainResult<()> {
        self.store
            .increment_counter(id, CounterField::ViewCount)
            .await?;
        self.invalidator.on_engagement(id).await;
        Ok(())
    }

    /// Record a download via the store's atomic counter increment.
    pub async fn record_download(&self, id: &str) -> DomainResult<()> {
        self.store
            .increment_counter(id, CounterField::DownloadCount)
            .await?;
        self.invalidator.on_engagement(id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheBackend;
    use crate::domain::ports::MemoryCatalogStore;
    use crate::services::query_cache::{QueryResultCache, TtlPolicy};
    use crate::services::snapshot::SnapshotManager;

    fn draft(json: &str) -> ItemDraft {
        serde_json::from_str(json).unwrap()
    }

    async fn service() -> (Arc<MemoryCatalogStore>, Arc<SnapshotManager>, CatalogService) {
        let store = Arc::new(MemoryCatalogStore::new());
        let snapshots = Arc::new(SnapshotManager::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            chrono::Duration::hours(1),
        ));
        let cache = Arc::new(QueryResultCache::new(
            Arc::new(MokaCacheBackend::new(100)),
            TtlPolicy::default(),
            100,
        ));
        let invalidator = Arc::new(Invalidator::new(Arc::clone(&snapshots), cache));
        let service = CatalogService::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            invalidator,
        );
        (store, snapshots, service)
    }

    #[tokio::test]
    async fn test_create_persists_and_refreshes_snapshot() {
        let (store, snapshots, service) = service().await;
        let item = service
            .create(draft(r#"{"title":"Outreach Agent","category":"Tools"}"#))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(item.categories, vec!["Tools".to_string()]);
        // Invalidator force-refreshed: the snapshot already has the item.
        assert!(snapshots.current().unwrap().get(&item.id).is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let (_, _, service) = service().await;
        let err = service.create(draft(r#"{"title":"no category"}"#)).await;
        assert!(matches!(err, Err(DomainError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let (_, _, service) = service().await;
        let err = service.update("ghost", draft("{}")).await;
        assert!(matches!(err, Err(DomainError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let (_, _, service) = service().await;
        let item = service
            .create(draft(r#"{"title":"t","category":"Tools"}"#))
            .await
            .unwrap();

        assert!(service.toggle_like(&item.id, "u1").await.unwrap());
        assert!(!service.toggle_like(&item.id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_view_increments_counter() {
        let (store, _, service) = service().await;
        let item = service
            .create(draft(r#"{"title":"t","category":"Tools"}"#))
            .await
            .unwrap();

        service.record_view(&item.id).await.unwrap();
        service.record_view(&item.id).await.unwrap();
        assert_eq!(store.get_by_id(&item.id).await.unwrap().unwrap().view_count, 2);
    }
}

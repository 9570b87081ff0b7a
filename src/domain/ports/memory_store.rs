//! In-memory catalog store implementation.
//!
//! Backs unit, property, and scenario tests without a database; also usable
//! as a throwaway store for demos. Mirrors the document-store semantics the
//! snapshot manager depends on, including atomic counter increments.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{CatalogStore, CounterField, ListOrder};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CatalogItem;

/// Catalog store holding items in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    items: RwLock<BTreeMap<String, CatalogItem>>,
    /// When set, every operation fails; lets tests exercise degraded paths.
    fail: AtomicBool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    pub async fn with_items(items: Vec<CatalogItem>) -> Self {
        let store = Self::new();
        {
            let mut map = store.items.write().await;
            for item in items {
                map.insert(item.id.clone(), item);
            }
        }
        store
    }

    /// Make every subsequent operation fail (simulates an unreachable store).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Store("simulated store outage".to_string()));
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_all(&self, order: ListOrder) -> DomainResult<Vec<CatalogItem>> {
        self.check()?;
        let mut items: Vec<CatalogItem> = self.items.read().await.values().cloned().collect();
        match order {
            ListOrder::CreatedDesc => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ListOrder::CreatedAsc => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(items)
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<CatalogItem>> {
        self.check()?;
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn create(&self, item: &CatalogItem) -> DomainResult<()> {
        self.check()?;
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(DomainError::Store(format!(
                "item already exists: {}",
                item.id
            )));
        }
        items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn update(&self, id: &str, item: &CatalogItem) -> DomainResult<()> {
        self.check()?;
        let mut items = self.items.write().await;
        if !items.contains_key(id) {
            return Err(DomainError::ItemNotFound(id.to_string()));
        }
        items.insert(id.to_string(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.check()?;
        self.items
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))
    }

    async fn increment_counter(&self, id: &str, field: CounterField) -> DomainResult<()> {
        self.check()?;
        let mut items = self.items.write().await;
        let item = items
            .get_mut(id)
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))?;
        match field {
            CounterField::ViewCount => item.view_count += 1,
            CounterField::DownloadCount => item.download_count += 1,
        }
        Ok(())
    }
}

//! Document store port.

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CatalogItem;

/// Ordering for full-collection loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Most recently created first (the snapshot's load order).
    CreatedDesc,
    CreatedAsc,
}

/// Engagement counters the store can increment atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    ViewCount,
    DownloadCount,
}

impl CounterField {
    /// Wire-format field name inside the stored document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewCount => "viewCount",
            Self::DownloadCount => "downloadCount",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "viewCount" | "view_count" | "views" => Ok(Self::ViewCount),
            "downloadCount" | "download_count" | "downloads" => Ok(Self::DownloadCount),
            other => Err(DomainError::UnknownCounterField(other.to_string())),
        }
    }
}

/// Repository trait for the catalog document store.
///
/// The store is the source of truth; the snapshot and the query-result cache
/// are both derived from it. Write operations must only be considered
/// successful once the store has acknowledged them — invalidation fires
/// afterwards.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load the entire collection in the requested order.
    ///
    /// An empty collection is a valid, non-error outcome.
    async fn list_all(&self, order: ListOrder) -> DomainResult<Vec<CatalogItem>>;

    /// Fetch a single item by id.
    async fn get_by_id(&self, id: &str) -> DomainResult<Option<CatalogItem>>;

    /// Persist a new item.
    ///
    /// # Errors
    /// Returns error if an item with the same id already exists or the store
    /// operation fails.
    async fn create(&self, item: &CatalogItem) -> DomainResult<()>;

    /// Replace the stored document for `id` with `item`.
    ///
    /// Partial-update semantics (merging a draft into the stored state) are
    /// the caller's responsibility; the store persists the full document.
    async fn update(&self, id: &str, item: &CatalogItem) -> DomainResult<()>;

    /// Delete an item by id.
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Atomically increment an engagement counter on the stored document.
    async fn increment_counter(&self, id: &str, field: CounterField) -> DomainResult<()>;
}

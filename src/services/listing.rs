//! Structured filtering, ordering, pagination, and the read-path service.
//!
//! The read path: canonicalize query -> cache lookup -> on hit return; on
//! miss -> capture a fresh snapshot reference once -> search -> filter ->
//! sort & paginate -> assemble response -> store in the query-result cache ->
//! return. The snapshot reference is captured at the start of the request, so
//! no mid-request swap can be observed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ActiveFilters, CatalogItem, ListingQuery, ListingResponse, PageMeta,
};
use crate::domain::ports::CatalogStore;
use crate::services::query_cache::QueryResultCache;
use crate::services::search::search_items;
use crate::services::snapshot::SnapshotManager;

/// Apply the structured predicates of `query` (logical AND across all present
/// predicates). An absent predicate is no constraint; the "All" category
/// sentinel was already normalized to absent during query construction.
pub fn filter_items<'a>(
    items: Vec<&'a CatalogItem>,
    query: &ListingQuery,
) -> Vec<&'a CatalogItem> {
    items
        .into_iter()
        .filter(|item| {
            if let Some(category) = &query.category {
                if !item.in_category(category) {
                    return false;
                }
            }
            if let Some(min) = query.price_min {
                if item.price < min {
                    return false;
                }
            }
            if let Some(max) = query.price_max {
                if item.price > max {
                    return false;
                }
            }
            if let Some(verified) = query.verified {
                if item.is_verified != verified {
                    return false;
                }
            }
            if let Some(featured) = query.featured {
                if item.is_featured != featured {
                    return false;
                }
            }
            if let Some(complexity) = &query.complexity {
                if item.complexity.as_deref() != Some(complexity.as_str()) {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Stable sort by `created_at` descending; items with equal timestamps keep
/// their relative order.
pub fn sort_by_recency(items: &mut [&CatalogItem]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Slice one page out of the filtered result set. Slicing beyond the end
/// yields an empty page, never an error.
pub fn paginate(items: &[&CatalogItem], limit: usize, offset: usize) -> (Vec<CatalogItem>, PageMeta) {
    let meta = PageMeta::compute(items.len(), limit, offset);
    let page = items
        .iter()
        .skip(offset)
        .take(limit)
        .map(|item| (*item).clone())
        .collect();
    (page, meta)
}

/// Read-path service over the snapshot and the query-result cache.
pub struct ListingService {
    snapshots: Arc<SnapshotManager>,
    cache: Arc<QueryResultCache>,
    store: Arc<dyn CatalogStore>,
}

impl ListingService {
    pub fn new(
        snapshots: Arc<SnapshotManager>,
        cache: Arc<QueryResultCache>,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            snapshots,
            cache,
            store,
        }
    }

    /// Serve one listing request, read-through the query-result cache.
    pub async fn list(&self, query: &ListingQuery) -> DomainResult<ListingResponse> {
        let started = Instant::now();
        let signature = query.signature();
        let key = signature.cache_key();

        if let Some(mut cached) = self.cache.get_json::<ListingResponse>(&key).await {
            debug!(signature = %signature, "listing cache hit");
            cached.from_cache = true;
            cached.response_time_ms = elapsed_ms(started);
            return Ok(cached);
        }

        // Capture the snapshot reference once; the rest of the request works
        // against this single generation.
        let snapshot = self.snapshots.ensure_fresh().await?;

        let hits = search_items(snapshot.items(), query.search.as_deref().unwrap_or(""));
        let mut filtered = filter_items(hits, query);
        sort_by_recency(&mut filtered);
        let (items, meta) = paginate(&filtered, query.limit, query.offset);

        let response = ListingResponse {
            items,
            meta,
            limit: query.limit,
            offset: query.offset,
            search_query: query.search.clone().unwrap_or_default(),
            filters: ActiveFilters::from(query),
            from_cache: false,
            response_time_ms: elapsed_ms(started),
        };

        self.cache
            .put_json(&key, &response, self.cache.policy().listing, &query.tags())
            .await;

        Ok(response)
    }

    /// Fetch a single item, read-through the single-item cache entry, falling
    /// back to the snapshot and finally the store (covers an item created
    /// between refreshes).
    pub async fn get_item(&self, id: &str) -> DomainResult<Option<CatalogItem>> {
        let key = QueryResultCache::item_key(id);
        if let Some(item) = self.cache.get_json::<CatalogItem>(&key).await {
            return Ok(Some(item));
        }

        let snapshot = self.snapshots.ensure_fresh().await?;
        let item = match snapshot.get(id) {
            Some(item) => Some(item.clone()),
            None => self.store.get_by_id(id).await?,
        };

        if let Some(item) = &item {
            self.cache
                .put_json(&key, item, self.cache.policy().item, &[])
                .await;
        }
        Ok(item)
    }

    /// Total item count, cached under the global count aggregate.
    pub async fn total_count(&self) -> DomainResult<usize> {
        let key = QueryResultCache::total_key();
        if let Some(count) = self.cache.get_json::<usize>(&key).await {
            return Ok(count);
        }

        let snapshot = self.snapshots.ensure_fresh().await?;
        let count = snapshot.item_count();
        self.cache
            .put_json(&key, &count, self.cache.policy().aggregate, &[])
            .await;
        Ok(count)
    }

    /// Per-category item counts, each cached under its own per-category
    /// aggregate entry so the invalidator can purge categories independently.
    pub async fn category_counts(&self) -> DomainResult<BTreeMap<String, usize>> {
        let snapshot = self.snapshots.ensure_fresh().await?;
        let mut counts = BTreeMap::new();

        for category in snapshot.categories() {
            let key = QueryResultCache::category_key(&category);
            let count = match self.cache.get_json::<usize>(&key).await {
                Some(count) => count,
                None => {
                    let count = snapshot
                        .items()
                        .iter()
                        .filter(|item| item.in_category(&category))
                        .count();
                    self.cache
                        .put_json(&key, &count, self.cache.policy().aggregate, &[])
                        .await;
                    count
                }
            };
            counts.insert(category, count);
        }
        Ok(counts)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: &str, categories: &[&str], price: f64, ts: i64) -> CatalogItem {
        let when = Utc.timestamp_opt(ts, 0).unwrap();
        let mut item = CatalogItem::new(id, when);
        item.categories = categories.iter().map(|c| (*c).to_string()).collect();
        item.normalize_categories();
        item.price = price;
        item
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let items = vec![item("a", &["X"], 1.0, 1), item("b", &["Y"], 2.0, 2)];
        let refs: Vec<&CatalogItem> = items.iter().collect();
        let out = filter_items(refs.clone(), &ListingQuery::default());
        assert_eq!(out.len(), refs.len());
    }

    #[test]
    fn test_category_matches_legacy_or_sequence() {
        // Scenario A: categories ["Writing"], ["Business"], ["Writing","AI"].
        let items = vec![
            item("1", &["Writing"], 0.0, 3),
            item("2", &["Business"], 0.0, 2),
            item("3", &["Writing", "AI"], 0.0, 1),
        ];
        let refs: Vec<&CatalogItem> = items.iter().collect();
        let query = ListingQuery {
            category: Some("Writing".to_string()),
            ..Default::default()
        };
        let out = filter_items(refs, &query);
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_price_bounds_inclusive() {
        let items = vec![
            item("cheap", &["X"], 10.0, 1),
            item("mid", &["X"], 20.0, 2),
            item("dear", &["X"], 30.0, 3),
        ];
        let refs: Vec<&CatalogItem> = items.iter().collect();
        let query = ListingQuery {
            price_min: Some(10.0),
            price_max: Some(20.0),
            ..Default::default()
        };
        let out = filter_items(refs, &query);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_flag_and_complexity_predicates() {
        let mut a = item("a", &["X"], 0.0, 1);
        a.is_verified = true;
        a.complexity = Some("advanced".to_string());
        let b = item("b", &["X"], 0.0, 2);
        let items = vec![a, b];
        let refs: Vec<&CatalogItem> = items.iter().collect();

        let query = ListingQuery {
            verified: Some(true),
            complexity: Some("advanced".to_string()),
            ..Default::default()
        };
        let out = filter_items(refs, &query);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn test_sort_is_recency_desc_and_stable() {
        let items = vec![
            item("old", &["X"], 0.0, 1),
            item("tie1", &["X"], 0.0, 5),
            item("tie2", &["X"], 0.0, 5),
            item("new", &["X"], 0.0, 9),
        ];
        let mut refs: Vec<&CatalogItem> = items.iter().collect();
        sort_by_recency(&mut refs);
        let ids: Vec<_> = refs.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "tie1", "tie2", "old"]);
    }

    #[test]
    fn test_paginate_beyond_end_is_empty() {
        // Scenario E: limit=10, offset=25 against 12 items.
        let items: Vec<CatalogItem> = (0..12).map(|i| item(&format!("{i}"), &["X"], 0.0, i)).collect();
        let refs: Vec<&CatalogItem> = items.iter().collect();
        let (page, meta) = paginate(&refs, 10, 25);
        assert!(page.is_empty());
        assert!(!meta.has_more);
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.total_count, 12);
    }

    #[test]
    fn test_paginate_page_size_law() {
        let items: Vec<CatalogItem> = (0..7).map(|i| item(&format!("{i}"), &["X"], 0.0, i)).collect();
        let refs: Vec<&CatalogItem> = items.iter().collect();
        for offset in 0..10 {
            let (page, _) = paginate(&refs, 3, offset);
            let expected = items.len().saturating_sub(offset).min(3);
            assert_eq!(page.len(), expected);
        }
    }
}

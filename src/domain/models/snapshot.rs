//! In-memory, point-in-time copy of an entire catalog collection.

use chrono::{DateTime, Utc};

use super::item::CatalogItem;

/// One consistent generation of the catalog.
///
/// Items are sorted by `created_at` descending at load time and hold at most
/// one entry per id. A snapshot is immutable once built; refreshes replace
/// the shared reference wholesale so readers always observe a single
/// generation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    items: Vec<CatalogItem>,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot from freshly loaded items.
    ///
    /// Deduplicates by id (first occurrence wins, matching the store's
    /// recency ordering) and enforces the `created_at` descending sort with a
    /// stable sort, so equal timestamps keep their load order.
    pub fn build(mut items: Vec<CatalogItem>, loaded_at: DateTime<Utc>) -> Self {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        items.retain(|item| seen.insert(item.id.clone()));
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { items, loaded_at }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Age of this snapshot relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.loaded_at
    }

    /// Distinct categories across all items, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for item in &self.items {
            for cat in &item.categories {
                if seen.insert(cat.clone()) {
                    out.push(cat.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, ts: i64) -> CatalogItem {
        let when = Utc.timestamp_opt(ts, 0).unwrap();
        let mut item = CatalogItem::new(id, when);
        item.created_at = when;
        item
    }

    #[test]
    fn test_build_sorts_by_created_at_desc() {
        let snap = Snapshot::build(vec![item("a", 10), item("b", 30), item("c", 20)], Utc::now());
        let ids: Vec<_> = snap.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_build_dedupes_by_id() {
        let snap = Snapshot::build(vec![item("a", 30), item("a", 10)], Utc::now());
        assert_eq!(snap.item_count(), 1);
        assert_eq!(snap.get("a").unwrap().created_at.timestamp(), 30);
    }

    #[test]
    fn test_equal_timestamps_keep_load_order() {
        let snap = Snapshot::build(vec![item("x", 5), item("y", 5), item("z", 5)], Utc::now());
        let ids: Vec<_> = snap.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_collection_is_valid() {
        let snap = Snapshot::build(Vec::new(), Utc::now());
        assert_eq!(snap.item_count(), 0);
        assert!(snap.categories().is_empty());
    }
}

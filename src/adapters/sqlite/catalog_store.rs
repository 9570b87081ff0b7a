//! `CatalogStore` implementation over SQLite.
//!
//! Each item is one row: the full document as a JSON payload plus a
//! `created_at` column for store-side recency ordering. Counter increments
//! run as a single `json_set` UPDATE, so they are atomic without a
//! read-modify-write round trip.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CatalogItem;
use crate::domain::ports::{CatalogStore, CounterField, ListOrder};

/// SQLite-backed catalog document store.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn decode(payload: &str) -> DomainResult<CatalogItem> {
        serde_json::from_str(payload).map_err(DomainError::from)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list_all(&self, order: ListOrder) -> DomainResult<Vec<CatalogItem>> {
        let sql = match order {
            ListOrder::CreatedDesc => {
                "SELECT payload FROM catalog_items ORDER BY created_at DESC"
            }
            ListOrder::CreatedAsc => "SELECT payload FROM catalog_items ORDER BY created_at ASC",
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Self::decode(row.get::<&str, _>("payload")))
            .collect()
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<CatalogItem>> {
        let row = sqlx::query("SELECT payload FROM catalog_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::decode(row.get::<&str, _>("payload")))
            .transpose()
    }

    async fn create(&self, item: &CatalogItem) -> DomainResult<()> {
        let payload = serde_json::to_string(item)?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO catalog_items (id, payload, created_at) VALUES (?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&payload)
        .bind(item.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Store(format!(
                "item already exists: {}",
                item.id
            )));
        }
        Ok(())
    }

    async fn update(&self, id: &str, item: &CatalogItem) -> DomainResult<()> {
        let payload = serde_json::to_string(item)?;
        let result = sqlx::query(
            "UPDATE catalog_items SET payload = ?, created_at = ? WHERE id = ?",
        )
        .bind(&payload)
        .bind(item.created_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn increment_counter(&self, id: &str, field: CounterField) -> DomainResult<()> {
        // Field names come from the CounterField enum, never from user input.
        let path = format!("$.{}", field.as_str());
        let result = sqlx::query(
            "UPDATE catalog_items
             SET payload = json_set(payload, ?1, COALESCE(json_extract(payload, ?1), 0) + 1)
             WHERE id = ?2",
        )
        .bind(&path)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::DatabaseConnection;
    use chrono::{TimeZone, Utc};

    async fn store() -> SqliteCatalogStore {
        let db = DatabaseConnection::new("sqlite::memory:").await.unwrap();
        db.init_schema().await.unwrap();
        SqliteCatalogStore::new(db.pool().clone())
    }

    fn item(id: &str, ts: i64) -> CatalogItem {
        let when = Utc.timestamp_opt(ts, 0).unwrap();
        let mut item = CatalogItem::new(id, when);
        item.title = format!("Item {id}");
        item.categories = vec!["Tools".to_string()];
        item.normalize_categories();
        item
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let store = store().await;
        let original = item("a", 100);
        store.create(&original).await.unwrap();
        let loaded = store.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let store = store().await;
        store.create(&item("a", 100)).await.unwrap();
        assert!(store.create(&item("a", 200)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_recency() {
        let store = store().await;
        store.create(&item("old", 100)).await.unwrap();
        store.create(&item("new", 300)).await.unwrap();
        store.create(&item("mid", 200)).await.unwrap();

        let items = store.list_all(ListOrder::CreatedDesc).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = store().await;
        let err = store.update("ghost", &item("ghost", 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_increment_counter_is_atomic_update() {
        let store = store().await;
        store.create(&item("a", 100)).await.unwrap();
        store
            .increment_counter("a", CounterField::ViewCount)
            .await
            .unwrap();
        store
            .increment_counter("a", CounterField::DownloadCount)
            .await
            .unwrap();
        store
            .increment_counter("a", CounterField::ViewCount)
            .await
            .unwrap();

        let loaded = store.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(loaded.view_count, 2);
        assert_eq!(loaded.download_count, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;
        store.create(&item("a", 100)).await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.get_by_id("a").await.unwrap(), None);
        assert!(matches!(
            store.delete("a").await.unwrap_err(),
            DomainError::ItemNotFound(_)
        ));
    }
}

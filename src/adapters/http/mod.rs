//! HTTP API adapter.
//!
//! Exposes the listing read path, the write path that drives invalidation,
//! and the administrative cache endpoints over axum.

pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::adapters::cache::MokaCacheBackend;
use crate::adapters::sqlite::{DatabaseConnection, SqliteCatalogStore};
use crate::domain::models::Config;
use crate::domain::ports::{CacheBackend, CatalogStore};
use crate::services::{
    CatalogService, Invalidator, ListingService, QueryResultCache, SnapshotManager, TtlPolicy,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<ListingService>,
    pub catalog: Arc<CatalogService>,
    pub snapshots: Arc<SnapshotManager>,
    pub cache: Arc<QueryResultCache>,
}

impl AppState {
    /// Wire the full service graph from configuration plus the two
    /// collaborator adapters.
    pub fn build(
        config: &Config,
        store: Arc<dyn CatalogStore>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        let snapshots = Arc::new(SnapshotManager::new(
            Arc::clone(&store),
            config.snapshot.max_staleness(),
        ));
        let cache = Arc::new(QueryResultCache::new(
            backend,
            TtlPolicy::from(&config.cache),
            config.cache.max_entries,
        ));
        let invalidator = Arc::new(Invalidator::new(
            Arc::clone(&snapshots),
            Arc::clone(&cache),
        ));
        let listing = Arc::new(ListingService::new(
            Arc::clone(&snapshots),
            Arc::clone(&cache),
            Arc::clone(&store),
        ));
        let catalog = Arc::new(CatalogService::new(store, invalidator));

        Self {
            listing,
            catalog,
            snapshots,
            cache,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/items/:id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/items/:id/like", post(handlers::toggle_like))
        .route("/items/:id/view", post(handlers::record_view))
        .route("/items/:id/download", post(handlers::record_download))
        .route("/categories", get(handlers::category_counts))
        .route("/cache/refresh", post(handlers::refresh_cache))
        .route("/cache/stats", get(handlers::cache_stats))
        .with_state(state)
}

/// Start the HTTP server with the SQLite store and moka cache adapters.
pub async fn serve(config: Config) -> Result<()> {
    let db = DatabaseConnection::new(&config.database.url).await?;
    db.init_schema().await?;
    let store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::new(db.pool().clone()));
    let backend: Arc<dyn CacheBackend> =
        Arc::new(MokaCacheBackend::new(config.cache.max_entries));

    let state = AppState::build(&config, store, backend);

    // Warm the snapshot so the first read does not pay the full load; a cold
    // store is not fatal, the first read will retry.
    if let Err(err) = state.snapshots.refresh().await {
        tracing::warn!(error = %err, "initial snapshot load failed, continuing cold");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "vitrine listening");

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}

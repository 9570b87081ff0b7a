//! Vitrine - Catalog Listing Engine
//!
//! Vitrine serves paginated, searchable, filterable listings over a catalog of
//! digital items backed by a document store, minimizing repeated store reads
//! with a two-tier cache: an in-process full-collection snapshot plus a
//! TTL-bound query-result cache invalidated explicitly on every write.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Service Layer** (`services`): Snapshot management, search/filter/paginate,
//!   query-result caching, and the invalidation protocol
//! - **Adapters** (`adapters`): SQLite document store, moka cache backend, HTTP API
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vitrine::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     vitrine::adapters::http::serve(config).await
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CacheConfig, CatalogItem, Config, ItemDraft, ListingQuery, ListingResponse, PageMeta,
    QuerySignature, Snapshot, SnapshotConfig,
};
pub use domain::ports::{CacheBackend, CatalogStore, CounterField, ListOrder};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CatalogService, Invalidator, ListingService, QueryResultCache, SnapshotManager,
};

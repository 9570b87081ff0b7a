//! Domain models for the Vitrine catalog engine.

pub mod config;
pub mod draft;
pub mod item;
pub mod page;
pub mod query;
pub mod snapshot;

pub use config::{
    CacheConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig, SnapshotConfig,
};
pub use draft::ItemDraft;
pub use item::{CatalogItem, Deliverable, Integration, ItemKind};
pub use page::{ActiveFilters, ListingResponse, PageMeta};
pub use query::{ListingQuery, QuerySignature};
pub use snapshot::Snapshot;

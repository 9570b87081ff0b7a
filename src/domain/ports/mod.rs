//! Ports: async trait boundaries to external collaborators.

pub mod cache_backend;
pub mod catalog_store;
pub mod memory_store;
pub mod null_cache;

pub use cache_backend::CacheBackend;
pub use catalog_store::{CatalogStore, CounterField, ListOrder};
pub use memory_store::MemoryCatalogStore;
pub use null_cache::NullCacheBackend;

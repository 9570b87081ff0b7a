//! Service layer: snapshot management, the listing pipeline, query-result
//! caching, and the write-triggered invalidation protocol.

pub mod catalog;
pub mod invalidator;
pub mod listing;
pub mod query_cache;
pub mod search;
pub mod snapshot;

pub use catalog::CatalogService;
pub use invalidator::Invalidator;
pub use listing::{filter_items, paginate, sort_by_recency, ListingService};
pub use query_cache::{QueryResultCache, TtlPolicy};
pub use search::search_items;
pub use snapshot::{SnapshotManager, SnapshotStats};

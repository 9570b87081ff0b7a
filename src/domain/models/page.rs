//! Paginated listing responses.

use serde::{Deserialize, Serialize};

use super::item::CatalogItem;
use super::query::ListingQuery;

/// Pagination metadata for one filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl PageMeta {
    /// Compute pagination metadata for a result set of `total_count` items.
    ///
    /// `limit` is assumed nonzero (query coercion guarantees it). `offset` is
    /// client-supplied and may be arbitrarily large, so the window end is
    /// computed saturating.
    pub fn compute(total_count: usize, limit: usize, offset: usize) -> Self {
        Self {
            total_count,
            current_page: offset / limit + 1,
            total_pages: total_count.div_ceil(limit),
            has_more: offset.saturating_add(limit) < total_count,
        }
    }
}

/// Echo of the filters that were active for a listing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
}

impl From<&ListingQuery> for ActiveFilters {
    fn from(query: &ListingQuery) -> Self {
        Self {
            category: query.category.clone(),
            price_min: query.price_min,
            price_max: query.price_max,
            verified: query.verified,
            featured: query.featured,
            complexity: query.complexity.clone(),
        }
    }
}

/// Full listing response: one page of items plus pagination metadata and an
/// echo of the request parameters. This is the value stored in the
/// query-result cache (with `from_cache = false`); it is always replaced or
/// deleted, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub items: Vec<CatalogItem>,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub limit: usize,
    pub offset: usize,
    pub search_query: String,
    pub filters: ActiveFilters,
    pub from_cache: bool,
    pub response_time_ms: u64,
}

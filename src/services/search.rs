//! Free-text search over catalog items.
//!
//! Boolean substring matching, not ranked retrieval: the query is tokenized
//! on whitespace and an item matches iff every token matches at least one of
//! a fixed set of text fields (case-insensitive containment). Search never
//! reorders; ordering belongs to the sort/paginate step.

use crate::domain::models::CatalogItem;

/// Narrow `items` to those matching `query`.
///
/// An empty or all-whitespace query short-circuits to the identity. Missing
/// optional fields simply fail to match for that field; they never error.
pub fn search_items<'a>(items: &'a [CatalogItem], query: &str) -> Vec<&'a CatalogItem> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| tokens.iter().all(|token| matches_token(item, token)))
        .collect()
}

/// True if any searchable field of `item` contains `token` (already
/// lowercased).
fn matches_token(item: &CatalogItem, token: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(token);

    contains(&item.title)
        || contains(&item.description)
        || item.category.as_deref().is_some_and(contains)
        || item.categories.iter().any(|c| contains(c))
        || contains(&item.business_value)
        || item.integrations.iter().any(|i| contains(&i.name))
        || item.features.iter().any(|f| contains(f))
        || item.tags.iter().any(|t| contains(t))
        || contains(&item.name)
        || item.deliverables.iter().any(|d| {
            contains(&d.description) || d.file_name.as_deref().is_some_and(contains)
        })
}

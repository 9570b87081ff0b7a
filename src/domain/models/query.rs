//! Listing query parameters and canonical cache signatures.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default page size when `limit` is absent or unparseable.
pub const DEFAULT_LIMIT: usize = 20;

/// Sentinel category value equivalent to "no category constraint".
pub const ALL_CATEGORIES: &str = "All";

/// Normalized search/filter/pagination parameters for one listing request.
///
/// Construction from raw request parameters is deliberately permissive:
/// numeric values that fail to parse are treated as absent and `limit`/`offset`
/// fall back to defaults rather than rejecting the request. This is an
/// explicit API design choice, not an oversight; the read path never returns
/// a 4xx for malformed filter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub verified: Option<bool>,
    pub featured: Option<bool>,
    pub complexity: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            price_min: None,
            price_max: None,
            verified: None,
            featured: None,
            complexity: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListingQuery {
    /// Build a query from raw string parameters (e.g. a URL query string),
    /// coercing malformed values to their defaults.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);

        Self {
            search: normalize_text(get("search")),
            category: normalize_category(get("category")),
            price_min: get("priceMin").and_then(parse_bound),
            price_max: get("priceMax").and_then(parse_bound),
            verified: get("verified").and_then(parse_flag),
            featured: get("featured").and_then(parse_flag),
            complexity: normalize_text(get("complexity")),
            limit: get("limit")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_LIMIT),
            offset: get("offset")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0),
        }
    }

    /// True when no search text is active.
    pub fn is_unsearched(&self) -> bool {
        self.search.is_none()
    }

    /// Canonical cache signature for this query.
    ///
    /// Semantically identical queries must collide to the same signature:
    /// search tokens are lowercased and sorted (AND-matching is
    /// order-independent), the "All" category sentinel and empty strings
    /// normalize to absent, and numbers render in a fixed format.
    pub fn signature(&self) -> QuerySignature {
        let tokens = self
            .search
            .as_deref()
            .map(|s| {
                let mut tokens: Vec<String> =
                    s.split_whitespace().map(str::to_lowercase).collect();
                tokens.sort();
                tokens.join(" ")
            })
            .unwrap_or_default();

        QuerySignature(format!(
            "q={}|cat={}|pmin={}|pmax={}|ver={}|feat={}|cx={}|limit={}|offset={}",
            tokens,
            self.category.as_deref().unwrap_or(""),
            fmt_bound(self.price_min),
            fmt_bound(self.price_max),
            fmt_flag(self.verified),
            fmt_flag(self.featured),
            self.complexity.as_deref().unwrap_or(""),
            self.limit,
            self.offset,
        ))
    }

    /// Invalidation tags for a cached result of this query.
    ///
    /// Every listing result carries the listing scope tag; category-filtered
    /// results additionally carry their category tag for targeted purges.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![QuerySignature::LISTING_SCOPE.to_string()];
        if let Some(cat) = &self.category {
            tags.push(format!("category:{cat}"));
        }
        tags
    }
}

fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_category(value: Option<&str>) -> Option<String> {
    normalize_text(value).filter(|v| !v.eq_ignore_ascii_case(ALL_CATEGORIES))
}

/// Parse an inclusive price bound; unparseable values are absent by policy.
fn parse_bound(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn fmt_bound(value: Option<f64>) -> String {
    value.map(|v| format!("{v}")).unwrap_or_default()
}

fn fmt_flag(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Canonical string key representing one combination of search, filters, and
/// pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySignature(String);

impl QuerySignature {
    /// Tag shared by every cached listing result.
    pub const LISTING_SCOPE: &'static str = "scope:listing";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full cache key for this signature within the listing namespace.
    pub fn cache_key(&self) -> String {
        format!("listing:{}", self.0)
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_on_empty_params() {
        let q = ListingQuery::from_params(&HashMap::new());
        assert_eq!(q, ListingQuery::default());
        assert_eq!(q.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_all_category_is_absent() {
        let q = ListingQuery::from_params(&params(&[("category", "All")]));
        assert_eq!(q.category, None);
        assert_eq!(q.signature(), ListingQuery::default().signature());
    }

    #[test]
    fn test_unparseable_numbers_coerce() {
        let q = ListingQuery::from_params(&params(&[
            ("priceMin", "cheap"),
            ("priceMax", "42"),
            ("limit", "lots"),
            ("offset", "-3"),
        ]));
        assert_eq!(q.price_min, None);
        assert_eq!(q.price_max, Some(42.0));
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_signature_ignores_token_order_and_case() {
        let a = ListingQuery {
            search: Some("Email Marketing".to_string()),
            ..Default::default()
        };
        let b = ListingQuery {
            search: Some("marketing   email".to_string()),
            ..Default::default()
        };
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_distinguishes_pagination() {
        let a = ListingQuery::default();
        let b = ListingQuery {
            offset: 20,
            ..Default::default()
        };
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_number_formatting_is_canonical() {
        let a = ListingQuery {
            price_min: Some(10.0),
            ..Default::default()
        };
        let b = ListingQuery::from_params(&params(&[("priceMin", "10")]));
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_tags_include_category() {
        let q = ListingQuery::from_params(&params(&[("category", "Writing")]));
        let tags = q.tags();
        assert!(tags.contains(&QuerySignature::LISTING_SCOPE.to_string()));
        assert!(tags.contains(&"category:Writing".to_string()));
    }
}

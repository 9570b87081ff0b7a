//! Write-path item shape.
//!
//! Incoming write payloads are loosely typed: list fields may arrive as a JSON
//! array, a JSON-encoded string (`"[\"a\",\"b\"]"`), or a bare
//! comma-separated string; numbers may arrive as strings. This module is the
//! single schema/validation boundary that normalizes those shapes exactly
//! once, before an item ever reaches the snapshot or the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::item::{CatalogItem, Deliverable, Integration, ItemKind};
use crate::domain::errors::{DomainError, DomainResult};

/// Normalized write payload for creating or updating a catalog item.
///
/// Every field is optional; on update, absent fields leave the stored value
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDraft {
    pub kind: Option<ItemKind>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub business_value: Option<String>,

    pub category: Option<String>,
    #[serde(deserialize_with = "flexible_string_list")]
    pub categories: Option<Vec<String>>,
    #[serde(deserialize_with = "flexible_string_list")]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "flexible_string_list")]
    pub features: Option<Vec<String>>,
    #[serde(deserialize_with = "flexible_integrations")]
    pub integrations: Option<Vec<Integration>>,
    pub deliverables: Option<Vec<Deliverable>>,

    #[serde(deserialize_with = "flexible_f64")]
    pub price: Option<f64>,
    pub is_verified: Option<bool>,
    pub is_featured: Option<bool>,
    pub complexity: Option<String>,
}

impl ItemDraft {
    /// Validate the draft for creation: a title and at least one category are
    /// required, everything else defaults.
    pub fn validate_for_create(&self) -> DomainResult<()> {
        let has_title = self.title.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_title {
            return Err(DomainError::ValidationFailed("title is required".into()));
        }
        let has_category = self.category.as_deref().is_some_and(|c| !c.trim().is_empty())
            || self
                .categories
                .as_deref()
                .is_some_and(|cs| cs.iter().any(|c| !c.trim().is_empty()));
        if !has_category {
            return Err(DomainError::ValidationFailed(
                "at least one category is required".into(),
            ));
        }
        Ok(())
    }

    /// Build a new canonical item from this draft.
    pub fn into_item(self, id: impl Into<String>, now: DateTime<Utc>) -> CatalogItem {
        let mut item = CatalogItem::new(id, now);
        self.apply(&mut item, now);
        item
    }

    /// Merge this draft into an existing item, leaving absent fields alone.
    pub fn merged_into(self, existing: &CatalogItem, now: DateTime<Utc>) -> CatalogItem {
        let mut item = existing.clone();
        self.apply(&mut item, now);
        item
    }

    fn apply(self, item: &mut CatalogItem, now: DateTime<Utc>) {
        if let Some(kind) = self.kind {
            item.kind = kind;
        }
        if let Some(title) = self.title {
            item.title = title.trim().to_string();
        }
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(bv) = self.business_value {
            item.business_value = bv;
        }
        // The singular field names the primary category. It always moves to
        // the front, and when the draft carries no `categories` list it also
        // replaces the previous primary rather than accumulating next to it.
        let replace_primary = self.categories.is_none();
        if let Some(categories) = self.categories {
            item.categories = categories;
            item.category = None;
        }
        if let Some(category) = self.category {
            let category = category.trim().to_string();
            if !category.is_empty() {
                item.categories.retain(|c| c != &category);
                if replace_primary && !item.categories.is_empty() {
                    item.categories.remove(0);
                }
                item.categories.insert(0, category.clone());
            }
            item.category = Some(category);
        }
        if let Some(tags) = self.tags {
            item.tags = tags;
        }
        if let Some(features) = self.features {
            item.features = features;
        }
        if let Some(integrations) = self.integrations {
            item.integrations = integrations;
        }
        if let Some(deliverables) = self.deliverables {
            item.deliverables = deliverables;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(v) = self.is_verified {
            item.is_verified = v;
        }
        if let Some(f) = self.is_featured {
            item.is_featured = f;
        }
        if let Some(complexity) = self.complexity {
            item.complexity = Some(complexity);
        }
        item.normalize_categories();
        item.updated_at = now;
    }
}

/// Accept a string list given as an array, a JSON-encoded array string, or a
/// bare (optionally comma-separated) string.
fn flexible_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(coerce_string_list))
}

fn coerce_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            // A JSON-encoded array smuggled inside a string.
            if trimmed.starts_with('[') {
                if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
                    return coerce_string_list(parsed);
                }
            }
            trimmed
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Accept integrations as structured objects, bare name strings, or a
/// JSON-encoded string of either.
fn flexible_integrations<'de, D>(deserializer: D) -> Result<Option<Vec<Integration>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(coerce_integrations))
}

fn coerce_integrations(value: Value) -> Vec<Integration> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => {
                    Some(Integration::named(s.trim().to_string()))
                }
                Value::Object(_) => serde_json::from_value(v).ok(),
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
                    return coerce_integrations(parsed);
                }
            }
            coerce_string_list(Value::String(s))
                .into_iter()
                .map(Integration::named)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Accept a number given as a JSON number or a numeric string; anything else
/// coerces to absent (deliberate API permissiveness, never an error).
fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_from_array() {
        let draft: ItemDraft =
            serde_json::from_str(r#"{"title":"t","categories":["Writing","AI"]}"#).unwrap();
        assert_eq!(
            draft.categories,
            Some(vec!["Writing".to_string(), "AI".to_string()])
        );
    }

    #[test]
    fn test_categories_from_json_encoded_string() {
        let draft: ItemDraft =
            serde_json::from_str(r#"{"categories":"[\"Writing\",\"AI\"]"}"#).unwrap();
        assert_eq!(
            draft.categories,
            Some(vec!["Writing".to_string(), "AI".to_string()])
        );
    }

    #[test]
    fn test_categories_from_bare_string() {
        let draft: ItemDraft = serde_json::from_str(r#"{"categories":"Writing, AI"}"#).unwrap();
        assert_eq!(
            draft.categories,
            Some(vec!["Writing".to_string(), "AI".to_string()])
        );
    }

    #[test]
    fn test_price_from_string() {
        let draft: ItemDraft = serde_json::from_str(r#"{"price":"19.5"}"#).unwrap();
        assert_eq!(draft.price, Some(19.5));
    }

    #[test]
    fn test_unparseable_price_is_absent() {
        let draft: ItemDraft = serde_json::from_str(r#"{"price":"abc"}"#).unwrap();
        assert_eq!(draft.price, None);
    }

    #[test]
    fn test_integrations_from_name_strings() {
        let draft: ItemDraft =
            serde_json::from_str(r#"{"integrations":["Slack","Notion"]}"#).unwrap();
        let names: Vec<_> = draft
            .integrations
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Slack", "Notion"]);
    }

    #[test]
    fn test_into_item_keeps_category_invariant() {
        let draft: ItemDraft =
            serde_json::from_str(r#"{"title":"t","category":"Tools"}"#).unwrap();
        draft.validate_for_create().unwrap();
        let item = draft.into_item("id-1", Utc::now());
        assert_eq!(item.category.as_deref(), Some("Tools"));
        assert_eq!(item.categories, vec!["Tools".to_string()]);
    }

    #[test]
    fn test_merge_changes_categories() {
        let now = Utc::now();
        let draft: ItemDraft =
            serde_json::from_str(r#"{"title":"t","category":"Tools"}"#).unwrap();
        let item = draft.into_item("id-1", now);

        let update: ItemDraft = serde_json::from_str(r#"{"categories":["Business"]}"#).unwrap();
        let updated = update.merged_into(&item, now);
        assert_eq!(updated.category.as_deref(), Some("Business"));
        assert_eq!(updated.categories, vec!["Business".to_string()]);
        assert_eq!(updated.title, "t");
    }

    #[test]
    fn test_legacy_category_update_replaces_primary() {
        let now = Utc::now();
        let seed: ItemDraft =
            serde_json::from_str(r#"{"title":"t","category":"Tools"}"#).unwrap();
        let item = seed.into_item("id-1", now);

        let update: ItemDraft = serde_json::from_str(r#"{"category":"Business"}"#).unwrap();
        let updated = update.merged_into(&item, now);
        assert_eq!(updated.categories, vec!["Business".to_string()]);
        assert!(!updated.in_category("Tools"));
        assert!(updated.in_category("Business"));
    }

    #[test]
    fn test_legacy_category_update_keeps_secondary_categories() {
        let now = Utc::now();
        let seed: ItemDraft =
            serde_json::from_str(r#"{"title":"t","categories":["Writing","AI"]}"#).unwrap();
        let item = seed.into_item("id-1", now);

        let update: ItemDraft = serde_json::from_str(r#"{"category":"Business"}"#).unwrap();
        let updated = update.merged_into(&item, now);
        assert_eq!(
            updated.categories,
            vec!["Business".to_string(), "AI".to_string()]
        );
        assert_eq!(updated.category.as_deref(), Some("Business"));
    }

    #[test]
    fn test_validate_requires_title_and_category() {
        let draft: ItemDraft = serde_json::from_str(r#"{"title":"  "}"#).unwrap();
        assert!(draft.validate_for_create().is_err());
        let draft: ItemDraft = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(draft.validate_for_create().is_err());
        let draft: ItemDraft =
            serde_json::from_str(r#"{"title":"t","categories":["X"]}"#).unwrap();
        assert!(draft.validate_for_create().is_ok());
    }
}

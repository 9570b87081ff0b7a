//! Catalog item domain model.
//!
//! One listed entity (agent, prompt, or platform video). Items carry both the
//! legacy singular `category` and the ordered `categories` sequence; the two
//! are kept mutually derivable (the first element of `categories` is the
//! primary legacy category).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Agent,
    Prompt,
    Video,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Agent
    }
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Prompt => "prompt",
            Self::Video => "video",
        }
    }
}

/// A third-party integration referenced by an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Integration {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// A downloadable artifact attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// One listed catalog entity.
///
/// Serialized field names follow the wire format of the catalog documents
/// (camelCase), so items round-trip unchanged through the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub kind: ItemKind,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub business_value: String,

    /// Legacy singular category; always the first element of `categories`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<Integration>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,

    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,

    /// User ids that have liked this item.
    #[serde(default)]
    pub likes: HashSet<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub download_count: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Create a minimal item with the given id and timestamps set to `now`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::default(),
            title: String::new(),
            name: String::new(),
            description: String::new(),
            business_value: String::new(),
            category: None,
            categories: Vec::new(),
            tags: Vec::new(),
            features: Vec::new(),
            integrations: Vec::new(),
            deliverables: Vec::new(),
            price: 0.0,
            is_verified: false,
            is_featured: false,
            complexity: None,
            likes: HashSet::new(),
            view_count: 0,
            download_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restore the `category` / `categories` invariant: the legacy singular
    /// field and the sequence must be mutually derivable.
    pub fn normalize_categories(&mut self) {
        self.categories.retain(|c| !c.trim().is_empty());
        match (&self.category, self.categories.first()) {
            (Some(cat), None) => self.categories = vec![cat.clone()],
            (None, Some(first)) => self.category = Some(first.clone()),
            (Some(cat), Some(first)) if cat != first => {
                self.category = Some(first.clone());
            }
            _ => {}
        }
    }

    /// True when the item belongs to `category`, checked against both the
    /// legacy singular field and membership in the categories sequence.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
            || self.categories.iter().any(|c| c == category)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Toggle a like for `user_id`. Returns true if the item is now liked.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        if self.likes.remove(user_id) {
            false
        } else {
            self.likes.insert(user_id.to_string());
            true
        }
    }
}

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rows::Table;

/// The three kinds of ordered taxonomy entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Subcategory,
    Location,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Category,
        EntityKind::Subcategory,
        EntityKind::Location,
    ];

    /// The store table holding rows of this kind
    pub fn table(self) -> Table {
        match self {
            EntityKind::Category => Table::Categories,
            EntityKind::Subcategory => Table::Subcategories,
            EntityKind::Location => Table::Locations,
        }
    }

    /// Subcategories are partitioned by owning category; the others are one global list.
    pub fn is_scoped(self) -> bool {
        self == EntityKind::Subcategory
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Category => "categories",
            EntityKind::Subcategory => "subcategories",
            EntityKind::Location => "locations",
        }
    }

    /// Next kind in tab order (wraps)
    pub fn next(self) -> EntityKind {
        match self {
            EntityKind::Category => EntityKind::Subcategory,
            EntityKind::Subcategory => EntityKind::Location,
            EntityKind::Location => EntityKind::Category,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "category"),
            EntityKind::Subcategory => write!(f, "subcategory"),
            EntityKind::Location => write!(f, "location"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "category" | "categories" | "cat" => Ok(EntityKind::Category),
            "subcategory" | "subcategories" | "sub" => Ok(EntityKind::Subcategory),
            "location" | "locations" | "loc" => Ok(EntityKind::Location),
            other => Err(format!(
                "unknown kind '{}' (expected category, subcategory or location)",
                other
            )),
        }
    }
}

/// The partition within which `sort_order` values are meaningful.
///
/// Categories and locations have a single global scope (`key == None`).
/// Subcategories are scoped by the id of their owning category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub kind: EntityKind,
    pub key: Option<String>,
}

impl Scope {
    /// The single list of an unscoped kind
    pub fn global(kind: EntityKind) -> Self {
        Scope { kind, key: None }
    }

    /// The subcategories of one category
    pub fn within(category_id: &str) -> Self {
        Scope {
            kind: EntityKind::Subcategory,
            key: Some(category_id.to_string()),
        }
    }

    /// The scope an item belongs to
    pub fn of(kind: EntityKind, item: &OrderedItem) -> Self {
        Scope {
            kind,
            key: if kind.is_scoped() {
                item.scope_key.clone()
            } else {
                None
            },
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} of {}", self.kind.plural(), key),
            None => write!(f, "{}", self.kind.plural()),
        }
    }
}

/// A row of an ordered collection, as the engine sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
    /// Owning category id for subcategories; `None` for global lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_key: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl OrderedItem {
    pub fn new(id: &str, name: &str, sort_order: i64) -> Self {
        OrderedItem {
            id: id.to_string(),
            name: name.to_string(),
            sort_order,
            scope_key: None,
            hidden: false,
        }
    }

    pub fn in_scope(mut self, key: &str) -> Self {
        self.scope_key = Some(key.to_string());
        self
    }
}

/// A (source, target) pair resolved to one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub scope_key: Option<String>,
    pub source_id: String,
    pub target_id: String,
}

/// Display order: `sort_order` ascending, ties broken by name.
pub fn display_order(a: &OrderedItem, b: &OrderedItem) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort a list into display order (stable).
pub fn sort_for_display(items: &mut [OrderedItem]) {
    items.sort_by(display_order);
}

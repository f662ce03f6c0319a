use serde::Serialize;

use crate::model::item::{EntityKind, OrderedItem};
use crate::ops::reorder::{Applied, ReorderError};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub hidden: bool,
    /// Rows in other tables that reference this item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<usize>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub kind: EntityKind,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct AppliedJson {
    pub kind: EntityKind,
    pub writes: usize,
    pub items: Vec<ItemJson>,
}

pub fn item_to_json(item: &OrderedItem, usage: Option<usize>) -> ItemJson {
    ItemJson {
        id: item.id.clone(),
        name: item.name.clone(),
        sort_order: item.sort_order,
        category_id: item.scope_key.clone(),
        hidden: item.hidden,
        usage,
    }
}

pub fn applied_to_json(kind: EntityKind, applied: &Applied) -> AppliedJson {
    AppliedJson {
        kind,
        writes: applied.writes,
        items: applied
            .items
            .iter()
            .map(|item| item_to_json(item, None))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One row: `  2  Pousadas  [c2]`, with `(hidden)` appended when hidden
pub fn format_item_line(item: &OrderedItem) -> String {
    let mut line = format!("{:>3}  {}  [{}]", item.sort_order, item.name, item.id);
    if item.hidden {
        line.push_str("  (hidden)");
    }
    line
}

/// Header above one category's subcategories
pub fn format_scope_header(category: Option<&OrderedItem>, key: &str) -> String {
    match category {
        Some(category) => format!("{} [{}]", category.name, category.id),
        None => format!("(missing category) [{}]", key),
    }
}

/// Lines printed after a write: the list it left behind
pub fn format_applied(applied: &Applied) -> Vec<String> {
    applied.items.iter().map(format_item_line).collect()
}

/// Lines describing what the store holds after a write batch stopped partway.
/// Empty when the error carries no re-fetched list.
pub fn format_partial(err: &ReorderError) -> Vec<String> {
    let Some(items) = err.resynced() else {
        return Vec::new();
    };
    let mut lines = vec!["stored order after the failed write:".to_string()];
    lines.extend(items.iter().map(format_item_line));
    lines
}

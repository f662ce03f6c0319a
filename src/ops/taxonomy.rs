use serde_json::Value;
use tracing::info;

use super::scope::{fetch_scope, find_item};
use crate::io::store::{Filter, Patch, RawRow, Store, StoreError};
use crate::model::item::{EntityKind, OrderedItem, Scope};
use crate::model::rows::parse_item;

/// Error type for taxonomy edits
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("a subcategory needs a category (--category <id>)")]
    MissingCategory,
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("store returned an unreadable row: {0}")]
    BadRow(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn clean_name(name: &str) -> Result<&str, TaxonomyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaxonomyError::EmptyName);
    }
    Ok(name)
}

fn require(store: &dyn Store, kind: EntityKind, id: &str) -> Result<OrderedItem, TaxonomyError> {
    find_item(store, kind, id)?.ok_or_else(|| TaxonomyError::NotFound {
        kind,
        id: id.to_string(),
    })
}

/// Add an item at the end of its scope.
///
/// `category_id` is required for subcategories and ignored otherwise.
pub fn add(
    store: &mut dyn Store,
    kind: EntityKind,
    name: &str,
    category_id: Option<&str>,
) -> Result<OrderedItem, TaxonomyError> {
    let name = clean_name(name)?;
    let scope = if kind.is_scoped() {
        let category_id = category_id.ok_or(TaxonomyError::MissingCategory)?;
        if find_item(store, EntityKind::Category, category_id)?.is_none() {
            return Err(TaxonomyError::CategoryNotFound(category_id.to_string()));
        }
        Scope::within(category_id)
    } else {
        Scope::global(kind)
    };

    let next_order = fetch_scope(store, &scope)?
        .iter()
        .map(|i| i.sort_order)
        .max()
        .map_or(0, |max| max + 1);

    let mut row = RawRow::new();
    row.insert("name".into(), Value::from(name));
    row.insert("sort_order".into(), Value::from(next_order));
    if let Some(key) = &scope.key {
        row.insert("category_id".into(), Value::from(key.as_str()));
    }
    let stored = store.insert(kind.table(), row)?;
    let item = parse_item(kind, &Value::Object(stored))?;
    info!(%scope, id = %item.id, name = %item.name, "added");
    Ok(item)
}

pub fn rename(
    store: &mut dyn Store,
    kind: EntityKind,
    id: &str,
    name: &str,
) -> Result<(), TaxonomyError> {
    let name = clean_name(name)?;
    require(store, kind, id)?;
    store.update(kind.table(), id, Patch::Name(name.to_string()))?;
    info!(%kind, id, name, "renamed");
    Ok(())
}

pub fn set_hidden(
    store: &mut dyn Store,
    kind: EntityKind,
    id: &str,
    hidden: bool,
) -> Result<(), TaxonomyError> {
    require(store, kind, id)?;
    store.update(kind.table(), id, Patch::Hidden(hidden))?;
    info!(%kind, id, hidden, "visibility changed");
    Ok(())
}

/// Delete an item. The store refuses while other rows reference it.
pub fn delete(store: &mut dyn Store, kind: EntityKind, id: &str) -> Result<(), TaxonomyError> {
    require(store, kind, id)?;
    store.delete(kind.table(), id)?;
    info!(%kind, id, "deleted");
    Ok(())
}

/// Number of rows in other tables referencing this item.
pub fn usage(store: &dyn Store, kind: EntityKind, id: &str) -> Result<usize, StoreError> {
    let mut count = 0;
    for (table, column) in kind.table().referenced_by() {
        count += store.select(*table, &Filter::eq(column, id))?.len();
    }
    Ok(count)
}

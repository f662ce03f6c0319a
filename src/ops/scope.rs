use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::io::store::{Filter, RawRow, Store, StoreError};
use crate::model::item::{EntityKind, OrderedItem, ReorderRequest, Scope, sort_for_display};
use crate::model::rows::parse_item;

/// The store filter selecting exactly one scope's rows
pub fn scope_filter(scope: &Scope) -> Filter {
    match (&scope.key, scope.kind.is_scoped()) {
        (Some(key), true) => Filter::eq("category_id", key),
        _ => Filter::All,
    }
}

fn parse_rows(kind: EntityKind, rows: Vec<RawRow>) -> Vec<OrderedItem> {
    let mut items: Vec<OrderedItem> = rows
        .into_iter()
        .filter_map(|row| {
            let raw = Value::Object(row);
            match parse_item(kind, &raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(%kind, row = %raw, error = %e, "skipping malformed row");
                    None
                }
            }
        })
        .collect();
    sort_for_display(&mut items);
    items
}

/// Fetch one scope's items in display order. Malformed rows are skipped.
pub fn fetch_scope(store: &dyn Store, scope: &Scope) -> Result<Vec<OrderedItem>, StoreError> {
    let rows = store.select(scope.kind.table(), &scope_filter(scope))?;
    Ok(parse_rows(scope.kind, rows))
}

/// Fetch every item of a kind, across all scopes.
pub fn fetch_kind(store: &dyn Store, kind: EntityKind) -> Result<Vec<OrderedItem>, StoreError> {
    let rows = store.select(kind.table(), &Filter::All)?;
    Ok(parse_rows(kind, rows))
}

/// Partition items by scope key.
///
/// Scopes appear in the order their first item appears; items keep their
/// display order within each scope. Unscoped kinds produce one group keyed
/// by `None`.
pub fn group_by_scope(
    kind: EntityKind,
    items: Vec<OrderedItem>,
) -> IndexMap<Option<String>, Vec<OrderedItem>> {
    let mut groups: IndexMap<Option<String>, Vec<OrderedItem>> = IndexMap::new();
    for item in items {
        let key = if kind.is_scoped() {
            item.scope_key.clone()
        } else {
            None
        };
        groups.entry(key).or_default().push(item);
    }
    for list in groups.values_mut() {
        sort_for_display(list);
    }
    groups
}

/// Look up an item of `kind` by id.
pub fn find_item(
    store: &dyn Store,
    kind: EntityKind,
    id: &str,
) -> Result<Option<OrderedItem>, StoreError> {
    let rows = store.select(kind.table(), &Filter::eq("id", id))?;
    Ok(parse_rows(kind, rows).into_iter().next())
}

/// Resolve a bare (source, target) pair into a request on one scope.
///
/// Returns `None` when either id is unknown, or when the two items live in
/// different scopes; neither case is an error.
pub fn resolve_request(
    store: &dyn Store,
    kind: EntityKind,
    source_id: &str,
    target_id: &str,
) -> Result<Option<ReorderRequest>, StoreError> {
    let Some(source) = find_item(store, kind, source_id)? else {
        debug!(%kind, source_id, "reorder source not found");
        return Ok(None);
    };
    let Some(target) = find_item(store, kind, target_id)? else {
        debug!(%kind, target_id, "reorder target not found");
        return Ok(None);
    };
    let source_scope = Scope::of(kind, &source);
    let target_scope = Scope::of(kind, &target);
    if source_scope != target_scope {
        debug!(%kind, source_id, target_id, "ignoring cross-scope reorder");
        return Ok(None);
    }
    Ok(Some(ReorderRequest {
        scope_key: source_scope.key,
        source_id: source.id,
        target_id: target.id,
    }))
}

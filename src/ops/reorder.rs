//! The reorder engine.
//!
//! Orders are computed in memory and persisted as one `sort_order` write per
//! row, issued sequentially. There is no transaction: when a write fails the
//! remaining writes are abandoned, the scope is re-fetched, and the caller
//! gets both the error and whatever order the store now holds.

use tracing::{debug, info, warn};

use super::scope::{fetch_kind, fetch_scope, group_by_scope};
use super::undo::{UndoBuffer, UndoSnapshot};
use crate::io::store::{Patch, Store, StoreError};
use crate::model::item::{EntityKind, OrderedItem, Scope};

/// Error type for reorder operations
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    /// A write failed. `resynced` is the scope as re-fetched afterwards,
    /// if that fetch succeeded.
    #[error("{source}")]
    Write {
        source: StoreError,
        resynced: Option<Vec<OrderedItem>>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReorderError {
    /// The list re-fetched after a failed write
    pub fn resynced(&self) -> Option<&[OrderedItem]> {
        match self {
            ReorderError::Write { resynced, .. } => resynced.as_deref(),
            ReorderError::Store(_) => None,
        }
    }
}

/// Result of a write batch: the scope as re-fetched, and how many rows changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub items: Vec<OrderedItem>,
    pub writes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Move `source_id` to the position of `target_id`.
///
/// Returns the list unchanged when either id is missing or they are equal.
pub fn reorder(list: &[OrderedItem], source_id: &str, target_id: &str) -> Vec<OrderedItem> {
    let from = list.iter().position(|i| i.id == source_id);
    let to = list.iter().position(|i| i.id == target_id);
    let (Some(from), Some(to)) = (from, to) else {
        return list.to_vec();
    };
    if from == to {
        return list.to_vec();
    }
    let mut next = list.to_vec();
    let item = next.remove(from);
    next.insert(to, item);
    next
}

pub(crate) struct Written {
    writes: usize,
    error: Option<StoreError>,
}

/// Write each target value, in order, skipping rows whose stored value
/// already matches. Stops at the first failure.
pub(crate) fn write_positions(
    store: &mut dyn Store,
    scope: &Scope,
    current: &[OrderedItem],
    targets: &[(&OrderedItem, i64)],
) -> Written {
    let table = scope.kind.table();
    let mut writes = 0;
    for (item, value) in targets {
        let Some(stored) = current.iter().find(|c| c.id == item.id) else {
            debug!(%scope, id = %item.id, "row no longer in scope, skipping");
            continue;
        };
        if stored.sort_order == *value {
            continue;
        }
        if let Err(e) = store.update(table, &item.id, Patch::SortOrder(*value)) {
            warn!(%scope, id = %item.id, error = %e, "sort_order write failed");
            return Written {
                writes,
                error: Some(e),
            };
        }
        writes += 1;
    }
    Written {
        writes,
        error: None,
    }
}

/// Re-fetch the scope after a write batch, whether or not it succeeded.
pub(crate) fn finish(
    store: &mut dyn Store,
    scope: &Scope,
    written: Written,
) -> Result<Applied, ReorderError> {
    let fetched = fetch_scope(store, scope);
    match written.error {
        Some(source) => Err(ReorderError::Write {
            source,
            resynced: fetched.ok(),
        }),
        None => Ok(Applied {
            items: fetched?,
            writes: written.writes,
        }),
    }
}

/// Persist `ordered` as the scope's order: `sort_order = index` for every item.
///
/// `current` is recorded as the kind's undo snapshot before anything is
/// written.
pub fn apply_order(
    store: &mut dyn Store,
    undo: &mut UndoBuffer,
    scope: &Scope,
    current: &[OrderedItem],
    ordered: &[OrderedItem],
) -> Result<Applied, ReorderError> {
    undo.record(UndoSnapshot::capture(scope, current));
    let targets: Vec<(&OrderedItem, i64)> = ordered
        .iter()
        .enumerate()
        .map(|(i, item)| (item, i as i64))
        .collect();
    let written = write_positions(store, scope, current, &targets);
    let applied = finish(store, scope, written)?;
    info!(%scope, writes = applied.writes, "order applied");
    Ok(applied)
}

/// Fetch the scope, move `source_id` onto `target_id`, and persist.
///
/// Returns `Ok(None)` without touching the store or the undo buffer when the
/// move is a no-op: unknown ids, ids outside this scope, or source == target.
pub fn reorder_and_apply(
    store: &mut dyn Store,
    undo: &mut UndoBuffer,
    scope: &Scope,
    source_id: &str,
    target_id: &str,
) -> Result<Option<Applied>, ReorderError> {
    let current = fetch_scope(store, scope)?;
    let ordered = reorder(&current, source_id, target_id);
    if ordered == current {
        debug!(%scope, source_id, target_id, "reorder is a no-op");
        return Ok(None);
    }
    apply_order(store, undo, scope, &current, &ordered).map(Some)
}

/// Reorder by bare ids, working out the scope from the source item.
/// Cross-scope pairs are ignored.
pub fn reorder_by_id(
    store: &mut dyn Store,
    undo: &mut UndoBuffer,
    kind: EntityKind,
    source_id: &str,
    target_id: &str,
) -> Result<Option<Applied>, ReorderError> {
    let Some(request) = super::scope::resolve_request(store, kind, source_id, target_id)? else {
        return Ok(None);
    };
    let scope = Scope {
        kind,
        key: request.scope_key,
    };
    reorder_and_apply(store, undo, &scope, &request.source_id, &request.target_id)
}

/// Send an item to the top or bottom of its scope, then renumber the scope.
pub fn move_to_extreme(
    store: &mut dyn Store,
    scope: &Scope,
    item_id: &str,
    extreme: Extreme,
) -> Result<Option<Applied>, ReorderError> {
    let current = fetch_scope(store, scope)?;
    if !current.iter().any(|i| i.id == item_id) {
        debug!(%scope, item_id, "move target not in scope");
        return Ok(None);
    }
    let value = match extreme {
        Extreme::Top => current.iter().map(|i| i.sort_order).min().unwrap_or(0) - 1,
        Extreme::Bottom => current.iter().map(|i| i.sort_order).max().unwrap_or(0) + 1,
    };
    if let Err(e) = store.update(scope.kind.table(), item_id, Patch::SortOrder(value)) {
        warn!(%scope, item_id, error = %e, "sort_order write failed");
        let written = Written {
            writes: 0,
            error: Some(e),
        };
        return finish(store, scope, written).map(Some);
    }
    let mut applied = normalize(store, scope)?;
    applied.writes += 1;
    Ok(Some(applied))
}

/// Rewrite the scope as 0..n in display order, healing gaps and duplicates.
pub fn normalize(store: &mut dyn Store, scope: &Scope) -> Result<Applied, ReorderError> {
    let current = fetch_scope(store, scope)?;
    let targets: Vec<(&OrderedItem, i64)> = current
        .iter()
        .enumerate()
        .map(|(i, item)| (item, i as i64))
        .collect();
    let written = write_positions(store, scope, &current, &targets);
    let applied = finish(store, scope, written)?;
    debug!(%scope, writes = applied.writes, "normalized");
    Ok(applied)
}

/// Normalize every scope of a kind. Returns the total number of writes.
pub fn normalize_kind(store: &mut dyn Store, kind: EntityKind) -> Result<usize, ReorderError> {
    let items = fetch_kind(store, kind)?;
    let scopes: Vec<Option<String>> = group_by_scope(kind, items).into_keys().collect();
    let mut writes = 0;
    for key in scopes {
        let scope = Scope { kind, key };
        writes += normalize(store, &scope)?.writes;
    }
    Ok(writes)
}

/// Exchange an item's `sort_order` with its neighbour's. No renumbering.
pub fn swap_with_neighbor(
    store: &mut dyn Store,
    scope: &Scope,
    item_id: &str,
    direction: Direction,
) -> Result<Option<Applied>, ReorderError> {
    let current = fetch_scope(store, scope)?;
    let Some(idx) = current.iter().position(|i| i.id == item_id) else {
        debug!(%scope, item_id, "swap target not in scope");
        return Ok(None);
    };
    let neighbor = match direction {
        Direction::Up => idx.checked_sub(1),
        Direction::Down => Some(idx + 1).filter(|n| *n < current.len()),
    };
    let Some(neighbor) = neighbor else {
        debug!(%scope, item_id, ?direction, "already at the edge");
        return Ok(None);
    };
    let item = &current[idx];
    let other = &current[neighbor];
    let targets = [(item, other.sort_order), (other, item.sort_order)];
    let written = write_positions(store, scope, &current, &targets);
    finish(store, scope, written).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_store::MemoryStore;
    use crate::ops::undo::undo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn abc() -> Vec<OrderedItem> {
        vec![
            OrderedItem::new("a", "A", 0),
            OrderedItem::new("b", "B", 1),
            OrderedItem::new("c", "C", 2),
        ]
    }

    fn store() -> MemoryStore {
        MemoryStore::from_json(json!({
            "categories": [
                {"id": "a", "name": "Restaurantes", "sort_order": 0},
                {"id": "b", "name": "Pousadas", "sort_order": 1},
                {"id": "c", "name": "Passeios", "sort_order": 2}
            ],
            "subcategories": [
                {"id": "s1", "name": "Pizzarias", "category_id": "a", "sort_order": 0},
                {"id": "s2", "name": "Cafeterias", "category_id": "a", "sort_order": 1},
                {"id": "s3", "name": "Hostels", "category_id": "b", "sort_order": 0},
                {"id": "s4", "name": "Campings", "category_id": "b", "sort_order": 1}
            ]
        }))
        .unwrap()
    }

    fn categories() -> Scope {
        Scope::global(EntityKind::Category)
    }

    fn ids(items: &[OrderedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn orders(items: &[OrderedItem]) -> Vec<(&str, i64)> {
        items.iter().map(|i| (i.id.as_str(), i.sort_order)).collect()
    }

    // -----------------------------------------------------------------------
    // reorder
    // -----------------------------------------------------------------------

    #[test]
    fn reorder_moves_source_to_target_index() {
        assert_eq!(ids(&reorder(&abc(), "b", "a")), vec!["b", "a", "c"]);
        assert_eq!(ids(&reorder(&abc(), "a", "c")), vec!["b", "c", "a"]);
        assert_eq!(ids(&reorder(&abc(), "c", "a")), vec!["c", "a", "b"]);
    }

    #[test]
    fn reorder_noops() {
        assert_eq!(reorder(&abc(), "a", "a"), abc());
        assert_eq!(reorder(&abc(), "x", "a"), abc());
        assert_eq!(reorder(&abc(), "a", "x"), abc());
    }

    // -----------------------------------------------------------------------
    // apply_order
    // -----------------------------------------------------------------------

    #[test]
    fn dropping_b_on_a_persists_sequential_indexes() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        let applied = reorder_and_apply(&mut store, &mut buffer, &categories(), "b", "a")
            .unwrap()
            .unwrap();
        assert_eq!(orders(&applied.items), vec![("b", 0), ("a", 1), ("c", 2)]);
        // c already sits at 2
        assert_eq!(applied.writes, 2);

        let refetched = fetch_scope(&store, &categories()).unwrap();
        assert_eq!(refetched, applied.items);
    }

    #[test]
    fn same_id_causes_no_writes_and_no_snapshot() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        let result = reorder_and_apply(&mut store, &mut buffer, &categories(), "a", "a").unwrap();
        assert_eq!(result, None);
        assert_eq!(store.update_count(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn cross_scope_reorder_is_ignored() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        let result =
            reorder_by_id(&mut store, &mut buffer, EntityKind::Subcategory, "s1", "s3").unwrap();
        assert_eq!(result, None);
        assert_eq!(store.update_count(), 0);

        let a = fetch_scope(&store, &Scope::within("a")).unwrap();
        let b = fetch_scope(&store, &Scope::within("b")).unwrap();
        assert_eq!(orders(&a), vec![("s1", 0), ("s2", 1)]);
        assert_eq!(orders(&b), vec![("s3", 0), ("s4", 1)]);
    }

    #[test]
    fn scoped_reorder_only_touches_its_partition() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        reorder_by_id(&mut store, &mut buffer, EntityKind::Subcategory, "s4", "s3")
            .unwrap()
            .unwrap();
        let a = fetch_scope(&store, &Scope::within("a")).unwrap();
        let b = fetch_scope(&store, &Scope::within("b")).unwrap();
        assert_eq!(orders(&a), vec![("s1", 0), ("s2", 1)]);
        assert_eq!(orders(&b), vec![("s4", 0), ("s3", 1)]);
    }

    #[test]
    fn failing_second_write_stops_the_batch() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        store.fail_nth_update(2, "permission denied for table categories");

        // c → a rewrites all three rows: c=0, a=1, b=2
        let err = reorder_and_apply(&mut store, &mut buffer, &categories(), "c", "a").unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table categories");
        assert_eq!(store.update_count(), 2);

        // only c=0 landed; a and b keep 0 and 1, and c wins the tie on name
        let resynced = err.resynced().unwrap();
        assert_eq!(orders(resynced), vec![("c", 0), ("a", 0), ("b", 1)]);
        assert_eq!(resynced, fetch_scope(&store, &categories()).unwrap().as_slice());
    }

    // -----------------------------------------------------------------------
    // undo
    // -----------------------------------------------------------------------

    #[test]
    fn undo_restores_previous_order_once() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        let before = fetch_scope(&store, &categories()).unwrap();
        reorder_and_apply(&mut store, &mut buffer, &categories(), "c", "a")
            .unwrap()
            .unwrap();

        let restored = undo(&mut store, &mut buffer, EntityKind::Category)
            .unwrap()
            .unwrap();
        assert_eq!(restored.items, before);

        let writes = store.update_count();
        assert_eq!(undo(&mut store, &mut buffer, EntityKind::Category).unwrap(), None);
        assert_eq!(store.update_count(), writes);
    }

    #[test]
    fn undo_slot_is_per_kind() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        reorder_by_id(&mut store, &mut buffer, EntityKind::Subcategory, "s2", "s1")
            .unwrap()
            .unwrap();
        assert_eq!(undo(&mut store, &mut buffer, EntityKind::Category).unwrap(), None);

        let restored = undo(&mut store, &mut buffer, EntityKind::Subcategory)
            .unwrap()
            .unwrap();
        assert_eq!(orders(&restored.items), vec![("s1", 0), ("s2", 1)]);
    }

    #[test]
    fn new_reorder_overwrites_snapshot() {
        let mut store = store();
        let mut buffer = UndoBuffer::new();
        reorder_and_apply(&mut store, &mut buffer, &categories(), "b", "a")
            .unwrap()
            .unwrap();
        // [b, a, c]
        reorder_and_apply(&mut store, &mut buffer, &categories(), "c", "b")
            .unwrap()
            .unwrap();
        // [c, b, a]; undo returns to [b, a, c], not the original
        let restored = undo(&mut store, &mut buffer, EntityKind::Category)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&restored.items), vec!["b", "a", "c"]);
    }

    // -----------------------------------------------------------------------
    // move_to_extreme / normalize / swap
    // -----------------------------------------------------------------------

    #[test]
    fn move_to_top_and_bottom() {
        let mut store = store();
        let applied = move_to_extreme(&mut store, &categories(), "c", Extreme::Top)
            .unwrap()
            .unwrap();
        assert_eq!(orders(&applied.items), vec![("c", 0), ("a", 1), ("b", 2)]);

        let applied = move_to_extreme(&mut store, &categories(), "c", Extreme::Bottom)
            .unwrap()
            .unwrap();
        assert_eq!(orders(&applied.items), vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn move_unknown_id_is_noop() {
        let mut store = store();
        let result = move_to_extreme(&mut store, &categories(), "zz", Extreme::Top).unwrap();
        assert_eq!(result, None);
        assert_eq!(store.update_count(), 0);
    }

    #[test]
    fn normalize_heals_gaps_and_duplicates() {
        let mut store = MemoryStore::from_json(json!({
            "locations": [
                {"id": "l1", "name": "Praia", "sort_order": 5},
                {"id": "l2", "name": "Centro", "sort_order": 5},
                {"id": "l3", "name": "Vila", "sort_order": null},
                {"id": "l4", "name": "Morro", "sort_order": 40}
            ]
        }))
        .unwrap();
        let scope = Scope::global(EntityKind::Location);
        let applied = normalize(&mut store, &scope).unwrap();
        assert_eq!(
            orders(&applied.items),
            vec![("l3", 0), ("l2", 1), ("l1", 2), ("l4", 3)]
        );
        // l3 already reads as 0
        assert_eq!(applied.writes, 3);
    }

    #[test]
    fn normalize_kind_covers_every_partition() {
        let mut store = MemoryStore::from_json(json!({
            "subcategories": [
                {"id": "s1", "name": "A", "category_id": "c1", "sort_order": 3},
                {"id": "s2", "name": "B", "category_id": "c1", "sort_order": 9},
                {"id": "s3", "name": "C", "category_id": "c2", "sort_order": 7}
            ]
        }))
        .unwrap();
        let writes = normalize_kind(&mut store, EntityKind::Subcategory).unwrap();
        assert_eq!(writes, 3);
        let c1 = fetch_scope(&store, &Scope::within("c1")).unwrap();
        let c2 = fetch_scope(&store, &Scope::within("c2")).unwrap();
        assert_eq!(orders(&c1), vec![("s1", 0), ("s2", 1)]);
        assert_eq!(orders(&c2), vec![("s3", 0)]);
    }

    #[test]
    fn swap_exchanges_with_neighbor() {
        let mut store = store();
        let applied = swap_with_neighbor(&mut store, &categories(), "b", Direction::Up)
            .unwrap()
            .unwrap();
        assert_eq!(orders(&applied.items), vec![("b", 0), ("a", 1), ("c", 2)]);
        assert_eq!(applied.writes, 2);

        let applied = swap_with_neighbor(&mut store, &categories(), "a", Direction::Down)
            .unwrap()
            .unwrap();
        assert_eq!(ids(&applied.items), vec!["b", "c", "a"]);
    }

    #[test]
    fn swap_at_edges_is_noop() {
        let mut store = store();
        assert_eq!(
            swap_with_neighbor(&mut store, &categories(), "a", Direction::Up).unwrap(),
            None
        );
        assert_eq!(
            swap_with_neighbor(&mut store, &categories(), "c", Direction::Down).unwrap(),
            None
        );
        assert_eq!(store.update_count(), 0);
    }
}

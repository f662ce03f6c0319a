use tracing::warn;

use super::reorder::{self, Applied, Direction, Extreme, ReorderError};
use super::scope::fetch_scope;
use super::taxonomy;
use super::undo::{self, UndoBuffer};
use crate::io::store::Store;
use crate::model::item::{OrderedItem, Scope};

/// One visible scope: its items as last fetched and its error area.
///
/// Every action clears the previous error, records a new one on failure,
/// and re-fetches, so `items` always reflects what the store holds.
#[derive(Debug, Clone)]
pub struct OrderedList {
    pub scope: Scope,
    pub items: Vec<OrderedItem>,
    pub error: Option<String>,
    /// True until the first successful fetch
    pub loading: bool,
}

impl OrderedList {
    pub fn new(scope: Scope) -> Self {
        OrderedList {
            scope,
            items: Vec::new(),
            error: None,
            loading: true,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn refresh(&mut self, store: &dyn Store) {
        match fetch_scope(store, &self.scope) {
            Ok(items) => {
                self.items = items;
                self.loading = false;
            }
            Err(e) => {
                warn!(scope = %self.scope, error = %e, "fetch failed");
                self.error = Some(e.to_string());
            }
        }
    }

    fn settle(
        &mut self,
        store: &dyn Store,
        result: Result<Option<Applied>, ReorderError>,
    ) -> bool {
        match result {
            Ok(Some(applied)) => {
                self.items = applied.items;
                self.loading = false;
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.error = Some(e.to_string());
                match e.resynced() {
                    Some(items) => self.items = items.to_vec(),
                    None => self.refresh(store),
                }
                false
            }
        }
    }

    /// Move `source_id` onto `target_id`. Returns true if anything was written.
    pub fn reorder(
        &mut self,
        store: &mut dyn Store,
        undo: &mut UndoBuffer,
        source_id: &str,
        target_id: &str,
    ) -> bool {
        self.error = None;
        let result = reorder::reorder_and_apply(store, undo, &self.scope, source_id, target_id);
        self.settle(store, result)
    }

    pub fn move_to_extreme(&mut self, store: &mut dyn Store, id: &str, extreme: Extreme) -> bool {
        self.error = None;
        let result = reorder::move_to_extreme(store, &self.scope, id, extreme);
        self.settle(store, result)
    }

    pub fn swap_with_neighbor(
        &mut self,
        store: &mut dyn Store,
        id: &str,
        direction: Direction,
    ) -> bool {
        self.error = None;
        let result = reorder::swap_with_neighbor(store, &self.scope, id, direction);
        self.settle(store, result)
    }

    pub fn normalize(&mut self, store: &mut dyn Store) -> bool {
        self.error = None;
        let result = reorder::normalize(store, &self.scope).map(Some);
        self.settle(store, result)
    }

    /// Undo the kind's last reorder. The restored scope may differ from this
    /// list's scope (another category's subcategories); this list is re-fetched
    /// either way.
    pub fn undo(&mut self, store: &mut dyn Store, buffer: &mut UndoBuffer) -> bool {
        self.error = None;
        let result = undo::undo(store, buffer, self.scope.kind);
        let applied = match result {
            Ok(applied) => applied.is_some(),
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        };
        self.refresh(store);
        applied
    }

    pub fn add(&mut self, store: &mut dyn Store, name: &str) -> Option<OrderedItem> {
        self.error = None;
        let result = taxonomy::add(store, self.scope.kind, name, self.scope.key.as_deref());
        let added = result.map_err(|e| self.error = Some(e.to_string())).ok();
        self.refresh(store);
        added
    }

    pub fn rename(&mut self, store: &mut dyn Store, id: &str, name: &str) -> bool {
        self.error = None;
        let result = taxonomy::rename(store, self.scope.kind, id, name);
        let ok = result.map_err(|e| self.error = Some(e.to_string())).is_ok();
        self.refresh(store);
        ok
    }

    pub fn set_hidden(&mut self, store: &mut dyn Store, id: &str, hidden: bool) -> bool {
        self.error = None;
        let result = taxonomy::set_hidden(store, self.scope.kind, id, hidden);
        let ok = result.map_err(|e| self.error = Some(e.to_string())).is_ok();
        self.refresh(store);
        ok
    }

    pub fn delete(&mut self, store: &mut dyn Store, id: &str) -> bool {
        self.error = None;
        let result = taxonomy::delete(store, self.scope.kind, id);
        let ok = result.map_err(|e| self.error = Some(e.to_string())).is_ok();
        self.refresh(store);
        ok
    }
}

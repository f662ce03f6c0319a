use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::reorder::{Applied, ReorderError, finish, write_positions};
use crate::io::store::Store;
use crate::model::item::{EntityKind, OrderedItem, Scope, sort_for_display};

/// A scope's list as it was immediately before a reorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_key: Option<String>,
    pub items: Vec<OrderedItem>,
    pub taken_at: DateTime<Utc>,
}

impl UndoSnapshot {
    pub fn capture(scope: &Scope, items: &[OrderedItem]) -> Self {
        UndoSnapshot {
            kind: scope.kind,
            scope_key: scope.key.clone(),
            items: items.to_vec(),
            taken_at: Utc::now(),
        }
    }

    pub fn scope(&self) -> Scope {
        Scope {
            kind: self.kind,
            key: self.scope_key.clone(),
        }
    }
}

/// One undo slot per entity kind. Recording overwrites the kind's slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UndoBuffer {
    #[serde(default)]
    slots: Vec<UndoSnapshot>,
}

impl UndoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: UndoSnapshot) {
        self.slots.retain(|s| s.kind != snapshot.kind);
        self.slots.push(snapshot);
    }

    pub fn peek(&self, kind: EntityKind) -> Option<&UndoSnapshot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    /// Remove and return the kind's snapshot.
    pub fn take(&mut self, kind: EntityKind) -> Option<UndoSnapshot> {
        let idx = self.slots.iter().position(|s| s.kind == kind)?;
        Some(self.slots.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Restore the last recorded order for `kind`.
///
/// The slot is cleared up front, so a second undo is a no-op even if this one
/// fails partway. Returns `Ok(None)` when there is nothing to undo.
pub fn undo(
    store: &mut dyn Store,
    buffer: &mut UndoBuffer,
    kind: EntityKind,
) -> Result<Option<Applied>, ReorderError> {
    let Some(snapshot) = buffer.take(kind) else {
        debug!(%kind, "nothing to undo");
        return Ok(None);
    };
    let scope = snapshot.scope();
    let mut items = snapshot.items;
    sort_for_display(&mut items);
    let targets: Vec<(&OrderedItem, i64)> = items.iter().map(|i| (i, i.sort_order)).collect();

    let current = super::scope::fetch_scope(store, &scope)?;
    let written = write_positions(store, &scope, &current, &targets);
    let applied = finish(store, &scope, written)?;
    info!(%scope, writes = applied.writes, "undo applied");
    Ok(Some(applied))
}

use serde_json::Value;

use super::store::{Filter, Patch, RawRow, Store, StoreError, Tables};
use crate::model::rows::Table;

/// A store that lives only in memory.
///
/// Update failures can be injected to exercise partial-write behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
    updates: usize,
    fail_on: Option<(usize, String)>,
}

impl MemoryStore {
    /// Build a store from a data.json-shaped document.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        Ok(MemoryStore {
            tables: Tables::from_json(value)?,
            updates: 0,
            fail_on: None,
        })
    }

    /// Reject the `n`th update from now (1-based) with `message`.
    /// The rejected update is not applied.
    pub fn fail_nth_update(&mut self, n: usize, message: &str) {
        self.fail_on = Some((self.updates + n, message.to_string()));
    }

    /// Number of update calls attempted so far, including rejected ones.
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl Store for MemoryStore {
    fn select(&self, table: Table, filter: &Filter) -> Result<Vec<RawRow>, StoreError> {
        Ok(self.tables.select(table, filter))
    }

    fn update(&mut self, table: Table, id: &str, patch: Patch) -> Result<(), StoreError> {
        self.updates += 1;
        if let Some((n, message)) = &self.fail_on
            && *n == self.updates
        {
            let message = message.clone();
            self.fail_on = None;
            return Err(StoreError::Rejected(message));
        }
        self.tables.update(table, id, patch)
    }

    fn insert(&mut self, table: Table, row: RawRow) -> Result<RawRow, StoreError> {
        self.tables.insert(table, row)
    }

    fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError> {
        self.tables.delete(table, id)
    }
}

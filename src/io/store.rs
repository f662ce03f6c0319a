use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::rows::{Table, cell_as_id};

/// A raw row as held by the store
pub type RawRow = Map<String, Value>;

/// Error type for table store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid data file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no row with id {id} in {table}")]
    RowNotFound { table: Table, id: String },
    #[error(
        "update or delete on table \"{table}\" violates foreign key constraint on table \"{referenced_by}\""
    )]
    ForeignKey { table: Table, referenced_by: Table },
    #[error("insert or update on table \"{table}\" violates foreign key constraint: {column}={value} is not present in \"{target}\"")]
    MissingReference {
        table: Table,
        column: String,
        value: String,
        target: Table,
    },
    #[error("{0}")]
    Rejected(String),
}

/// Row filter for [`Store::select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Column equals value (compared in id string form)
    Eq { column: String, value: String },
}

impl Filter {
    pub fn eq(column: &str, value: &str) -> Self {
        Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn matches(&self, row: &RawRow) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { column, value } => row
                .get(column)
                .and_then(cell_as_id)
                .is_some_and(|v| v == *value),
        }
    }
}

/// A single-field update
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    SortOrder(i64),
    Name(String),
    Hidden(bool),
}

impl Patch {
    pub fn column(&self) -> &'static str {
        match self {
            Patch::SortOrder(_) => "sort_order",
            Patch::Name(_) => "name",
            Patch::Hidden(_) => "hidden",
        }
    }

    fn value(&self) -> Value {
        match self {
            Patch::SortOrder(n) => Value::from(*n),
            Patch::Name(s) => Value::from(s.as_str()),
            Patch::Hidden(b) => Value::from(*b),
        }
    }
}

/// The table store the engine persists through.
///
/// Every call is one round trip; callers issue them sequentially and never
/// assume a batch of calls is atomic.
pub trait Store {
    /// Rows of `table` matching `filter`, ordered by `sort_order` ascending then
    /// `name` ascending. A missing or null `sort_order` sorts as 0.
    fn select(&self, table: Table, filter: &Filter) -> Result<Vec<RawRow>, StoreError>;

    /// Update one field of the row with the given id.
    fn update(&mut self, table: Table, id: &str, patch: Patch) -> Result<(), StoreError>;

    /// Insert a row, generating an id if the row has none. Returns the stored row.
    fn insert(&mut self, table: Table, row: RawRow) -> Result<RawRow, StoreError>;

    /// Delete the row with the given id. Fails while other rows reference it.
    fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError>;

    /// Pick up changes made by other writers. A store nobody else writes to
    /// has nothing to do.
    fn reload(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory table set shared by the store implementations.
///
/// Rows are kept as raw JSON values so that rows this crate cannot parse are
/// carried through writes untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables {
    tables: IndexMap<String, Vec<Value>>,
}

impl Tables {
    /// A table set with every known table present and empty
    pub fn empty() -> Self {
        let mut tables = IndexMap::new();
        for table in Table::ALL {
            tables.insert(table.name().to_string(), Vec::new());
        }
        Tables { tables }
    }

    /// Build a table set from a JSON document (as stored in data.json)
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let mut tables: Tables = serde_json::from_value(value)?;
        for table in Table::ALL {
            tables.tables.entry(table.name().to_string()).or_default();
        }
        Ok(tables)
    }

    pub fn rows(&self, table: Table) -> &[Value] {
        self.tables
            .get(table.name())
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Value> {
        self.tables.entry(table.name().to_string()).or_default()
    }

    fn find_mut(&mut self, table: Table, id: &str) -> Option<&mut RawRow> {
        self.rows_mut(table)
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|row| row.get("id").and_then(cell_as_id).as_deref() == Some(id))
    }

    fn contains(&self, table: Table, id: &str) -> bool {
        self.rows(table)
            .iter()
            .filter_map(Value::as_object)
            .any(|row| row.get("id").and_then(cell_as_id).as_deref() == Some(id))
    }

    pub fn select(&self, table: Table, filter: &Filter) -> Vec<RawRow> {
        let mut rows: Vec<RawRow> = self
            .rows(table)
            .iter()
            .filter_map(Value::as_object)
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            sort_key(a)
                .cmp(&sort_key(b))
                .then_with(|| name_key(a).cmp(name_key(b)))
        });
        rows
    }

    pub fn update(&mut self, table: Table, id: &str, patch: Patch) -> Result<(), StoreError> {
        let row = self
            .find_mut(table, id)
            .ok_or_else(|| StoreError::RowNotFound {
                table,
                id: id.to_string(),
            })?;
        row.insert(patch.column().to_string(), patch.value());
        Ok(())
    }

    pub fn insert(&mut self, table: Table, mut row: RawRow) -> Result<RawRow, StoreError> {
        for (column, target) in table.references() {
            let Some(value) = row.get(*column).and_then(cell_as_id) else {
                continue;
            };
            if !self.contains(*target, &value) {
                return Err(StoreError::MissingReference {
                    table,
                    column: column.to_string(),
                    value,
                    target: *target,
                });
            }
        }
        if !row.get("id").is_some_and(|id| cell_as_id(id).is_some()) {
            row.insert(
                "id".to_string(),
                Value::from(uuid::Uuid::new_v4().to_string()),
            );
        }
        self.rows_mut(table).push(Value::Object(row.clone()));
        Ok(row)
    }

    pub fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError> {
        for (from, column) in table.referenced_by() {
            let referenced = self
                .rows(*from)
                .iter()
                .filter_map(Value::as_object)
                .any(|row| row.get(*column).and_then(cell_as_id).as_deref() == Some(id));
            if referenced {
                return Err(StoreError::ForeignKey {
                    table,
                    referenced_by: *from,
                });
            }
        }
        let rows = self.rows_mut(table);
        let before = rows.len();
        rows.retain(|row| {
            row.as_object()
                .and_then(|r| r.get("id"))
                .and_then(cell_as_id)
                .as_deref()
                != Some(id)
        });
        if rows.len() == before {
            return Err(StoreError::RowNotFound {
                table,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn sort_key(row: &RawRow) -> i64 {
    row.get("sort_order").and_then(Value::as_i64).unwrap_or(0)
}

fn name_key(row: &RawRow) -> &str {
    row.get("name").and_then(Value::as_str).unwrap_or("")
}

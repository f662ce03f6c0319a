use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::store::{Filter, Patch, RawRow, Store, StoreError, Tables};
use crate::model::rows::Table;

/// A store backed by a single JSON document on disk.
///
/// Each mutation is applied to a copy of the tables, written back atomically,
/// and only then becomes visible to later reads. A failed write leaves both
/// the file and the in-memory state as they were.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    tables: Tables,
}

impl JsonStore {
    /// Open an existing data file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let tables = read_tables(path)?;
        Ok(JsonStore {
            path: path.to_path_buf(),
            tables,
        })
    }

    /// Create a data file holding `tables`, overwriting whatever is there.
    pub fn create(path: &Path, tables: Tables) -> Result<Self, StoreError> {
        write_tables(path, &tables)?;
        Ok(JsonStore {
            path: path.to_path_buf(),
            tables,
        })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.tables.clone();
        let out = change(&mut next)?;
        write_tables(&self.path, &next)?;
        self.tables = next;
        Ok(out)
    }
}

impl Store for JsonStore {
    fn select(&self, table: Table, filter: &Filter) -> Result<Vec<RawRow>, StoreError> {
        Ok(self.tables.select(table, filter))
    }

    fn update(&mut self, table: Table, id: &str, patch: Patch) -> Result<(), StoreError> {
        self.commit(|tables| tables.update(table, id, patch))
    }

    fn insert(&mut self, table: Table, row: RawRow) -> Result<RawRow, StoreError> {
        self.commit(|tables| tables.insert(table, row))
    }

    fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError> {
        self.commit(|tables| tables.delete(table, id))
    }

    /// Re-read the file, picking up writes from other processes.
    fn reload(&mut self) -> Result<(), StoreError> {
        self.tables = read_tables(&self.path)?;
        Ok(())
    }
}

fn read_tables(path: &Path) -> Result<Tables, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    Tables::from_json(value).map_err(|e| StoreError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_tables(path: &Path, tables: &Tables) -> Result<(), StoreError> {
    let mut text = serde_json::to_string_pretty(tables).map_err(|e| StoreError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.push('\n');
    atomic_write(path, text.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a file atomically: temp file in the same directory, then rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

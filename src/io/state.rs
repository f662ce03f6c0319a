use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::json_store::atomic_write;
use crate::model::item::EntityKind;
use crate::ops::undo::UndoBuffer;

/// Persisted console state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleState {
    /// Which tab is showing
    pub kind: EntityKind,
    /// Category whose subcategories the subcategory tab shows
    #[serde(default)]
    pub category: Option<String>,
}

/// Read .undo.json from the guide directory. A missing or unreadable file is
/// an empty buffer.
pub fn read_undo(guide_dir: &Path) -> UndoBuffer {
    let path = guide_dir.join(".undo.json");
    let Ok(content) = fs::read_to_string(&path) else {
        return UndoBuffer::new();
    };
    match serde_json::from_str(&content) {
        Ok(buffer) => buffer,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding unreadable undo buffer");
            UndoBuffer::new()
        }
    }
}

/// Write .undo.json to the guide directory
pub fn write_undo(guide_dir: &Path, buffer: &UndoBuffer) -> Result<(), std::io::Error> {
    let path = guide_dir.join(".undo.json");
    let content = serde_json::to_string_pretty(buffer)?;
    atomic_write(&path, content.as_bytes())
}

/// Read .state.json from the guide directory
pub fn read_console_state(guide_dir: &Path) -> Option<ConsoleState> {
    let path = guide_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the guide directory
pub fn write_console_state(guide_dir: &Path, state: &ConsoleState) -> Result<(), std::io::Error> {
    let path = guide_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&path, content.as_bytes())
}

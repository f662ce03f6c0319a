pub mod list;
pub mod reorder;
pub mod scope;
pub mod taxonomy;
pub mod undo;

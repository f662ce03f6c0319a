pub mod json_store;
pub mod lock;
pub mod memory_store;
pub mod state;
pub mod store;
pub mod watcher;
pub mod workspace_io;

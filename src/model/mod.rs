pub mod config;
pub mod item;
pub mod rows;
pub mod workspace;

pub use config::*;
pub use item::*;
pub use rows::*;
pub use workspace::*;

use std::path::PathBuf;

use super::config::GuideConfig;

/// A loaded guide workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory (parent of `guide/`)
    pub root: PathBuf,
    /// Path to the `guide/` directory
    pub guide_dir: PathBuf,
    /// Parsed guide.toml
    pub config: GuideConfig,
}

impl Workspace {
    /// Path of the table data file
    pub fn data_path(&self) -> PathBuf {
        self.guide_dir.join(&self.config.store.data_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.guide_dir.join("guide.log")
    }
}

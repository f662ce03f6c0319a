use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::GuideConfig;
use crate::model::workspace::Workspace;

/// Error type for workspace discovery and loading
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("not a guide workspace: no guide/ directory found")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse guide.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

/// Discover the workspace root by walking up from `start`, looking for a
/// `guide/` directory holding a `guide.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, GuideError> {
    let mut current = start.to_path_buf();
    loop {
        let guide_dir = current.join("guide");
        if guide_dir.is_dir() && guide_dir.join("guide.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(GuideError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, GuideError> {
    let guide_dir = root.join("guide");
    if !guide_dir.is_dir() {
        return Err(GuideError::NotAWorkspace);
    }

    let config_path = guide_dir.join("guide.toml");
    let text = fs::read_to_string(&config_path).map_err(|e| GuideError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: GuideConfig = toml::from_str(&text)?;

    Ok(Workspace {
        root: root.to_path_buf(),
        guide_dir,
        config,
    })
}

//! Helpers shared by CLI handlers

use crate::config::DATA_DIR;
use crate::error::{HelpdeskError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Find the project root: the nearest ancestor of `start` (or the current
/// directory) that contains a `.helpdesk` directory
pub fn find_project_root(start: Option<&str>) -> Result<PathBuf> {
    let start = match start {
        Some(dir) => PathBuf::from(dir),
        None => env::current_dir()?,
    };

    start
        .ancestors()
        .find(|dir| is_project_root(dir))
        .map(Path::to_path_buf)
        .ok_or(HelpdeskError::ProjectNotInitialized)
}

fn is_project_root(dir: &Path) -> bool {
    dir.join(DATA_DIR).is_dir()
}

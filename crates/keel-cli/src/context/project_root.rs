use std::path::{Path, PathBuf};

use keel_config::PROJECT_DIR;

/// Walk upwards from `start` until a `.keel` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

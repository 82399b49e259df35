//! Path normalization utilities.

use crate::fileserver::sanitize::clean;
use std::path::{Path, PathBuf};

/// Make a path absolute without touching the filesystem.
///
/// Relative paths are joined onto the current directory, then `.` and `..`
/// are resolved lexically. Symlinks are not followed, so the result names
/// the same file the server would open.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };
    PathBuf::from(clean(&joined.to_string_lossy()))
}

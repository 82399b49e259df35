//! Directory index lookup.

use super::fs::{FileInfo, FileSystem};
use super::hidden::HideList;
use super::replace::Substitute;
use super::sanitize::sanitized_join;
use crate::debug;
use std::path::{Path, PathBuf};

/// Find the index file to serve for directory `dir`.
///
/// `index_names` is a priority list: candidates are tried in order and the
/// first one that is not hidden and exists wins. Candidate names may carry
/// placeholders (unknown ones become empty).
pub fn resolve_index(
    fs: &dyn FileSystem,
    dir: &Path,
    index_names: &[String],
    hide: &HideList,
    repl: &dyn Substitute,
) -> Option<(PathBuf, FileInfo)> {
    let dir = dir.to_string_lossy();

    for name in index_names {
        let name = repl.replace_all(name, "");
        let candidate = sanitized_join(&dir, &name);

        if hide.is_hidden(&candidate) {
            debug!("index"; "hiding index file {}", candidate.display());
            continue;
        }

        let Ok(info) = fs.stat(&candidate) else {
            continue;
        };

        debug!("index"; "located index file {}", candidate.display());
        return Some((candidate, info));
    }

    None
}

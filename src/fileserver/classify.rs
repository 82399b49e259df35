//! Mapping of filesystem errors onto the request error taxonomy.
//!
//! Asking for `file.txt/child` fails with `ENOTDIR` on Unix (and with other
//! opaque codes elsewhere) rather than "not found". Such errors are
//! re-checked by walking the path: if some prefix exists as a regular file,
//! nothing below it can exist and the request is a plain 404.

use super::error::ResolveError;
use super::fs::FileSystem;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Coarse class of a filesystem error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    NotFound,
    PermissionDenied,
    Other,
}

/// Classify `err`, raised while accessing `path`.
///
/// Only ambiguous errors trigger the extra prefix walk.
pub fn classify(fs: &dyn FileSystem, err: &io::Error, path: &Path) -> FsErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput | io::ErrorKind::InvalidFilename => {
            FsErrorKind::NotFound
        }
        io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
        _ if has_file_prefix(fs, path) => FsErrorKind::NotFound,
        _ => FsErrorKind::Other,
    }
}

/// Turn a filesystem error into the request error.
pub fn into_resolve_error(fs: &dyn FileSystem, err: io::Error, path: &Path) -> ResolveError {
    match classify(fs, &err, path) {
        FsErrorKind::NotFound => ResolveError::NotFound,
        FsErrorKind::PermissionDenied => ResolveError::PermissionDenied(err),
        FsErrorKind::Other => ResolveError::Internal(err),
    }
}

/// Whether some prefix of `path` exists and is not a directory.
///
/// Gives up (returns `false`) at the first prefix that cannot be stat'ed.
fn has_file_prefix(fs: &dyn FileSystem, path: &Path) -> bool {
    let mut prefix = PathBuf::new();

    for component in path.components() {
        prefix.push(component);
        if !matches!(component, Component::Normal(_) | Component::ParentDir) {
            continue;
        }
        match fs.stat(&prefix) {
            Ok(info) if !info.is_dir => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }

    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::fileserver::fs::{MemFs, OsFs};
    use tempfile::TempDir;

    fn not_a_directory() -> io::Error {
        io::Error::from(io::ErrorKind::NotADirectory)
    }

    #[test]
    fn test_clean_errors_pass_through() {
        let fs = MemFs::new();
        let path = Path::new("/site/a");

        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(classify(&fs, &err, path), FsErrorKind::NotFound);

        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(classify(&fs, &err, path), FsErrorKind::PermissionDenied);

        let err = io::Error::from(io::ErrorKind::InvalidInput);
        assert_eq!(classify(&fs, &err, path), FsErrorKind::NotFound);

        // No prefix walk on the common error path
        assert!(fs.stat_log().is_empty());
    }

    #[test]
    fn test_file_used_as_directory_is_not_found() {
        let fs = MemFs::new().file("/site/file.txt", "x");
        let path = Path::new("/site/file.txt/sub");

        assert_eq!(classify(&fs, &not_a_directory(), path), FsErrorKind::NotFound);
        assert_eq!(
            fs.stat_log(),
            [
                PathBuf::from("/site"),
                PathBuf::from("/site/file.txt"),
            ]
        );
    }

    #[test]
    fn test_unreproducible_error_stays_internal() {
        let fs = MemFs::new().dir("/site/a/b");

        // Every prefix is a directory
        let path = Path::new("/site/a/b");
        assert_eq!(classify(&fs, &io::Error::other("io"), path), FsErrorKind::Other);

        // Walk stops at the first missing prefix
        let path = Path::new("/site/missing/x");
        assert_eq!(classify(&fs, &io::Error::other("io"), path), FsErrorKind::Other);
    }

    #[test]
    fn test_into_resolve_error() {
        let fs = MemFs::new().file("/site/file.txt", "x");

        let err = into_resolve_error(&fs, not_a_directory(), Path::new("/site/file.txt/sub"));
        assert!(matches!(err, ResolveError::NotFound));

        let err = into_resolve_error(
            &fs,
            io::Error::from(io::ErrorKind::PermissionDenied),
            Path::new("/site/x"),
        );
        assert!(matches!(err, ResolveError::PermissionDenied(_)));

        let err = into_resolve_error(&fs, io::Error::other("disk"), Path::new("/site"));
        assert!(matches!(err, ResolveError::Internal(_)));
    }

    #[test]
    fn test_real_disk_not_a_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();
        let path = dir.path().join("file.txt").join("sub");

        let err = OsFs.stat(&path).unwrap_err();
        assert!(matches!(
            into_resolve_error(&OsFs, err, &path),
            ResolveError::NotFound
        ));
    }

    #[test]
    fn test_relative_paths() {
        let fs = MemFs::new().file("/public/page.html", "x");
        let path = Path::new("public/page.html/more");
        assert_eq!(classify(&fs, &not_a_directory(), path), FsErrorKind::NotFound);
    }
}

//! Filesystem capability.
//!
//! The resolver only touches the disk through [`FileSystem`], so it can run
//! against [`OsFs`] in production and an in-memory tree in tests.

use super::glob;
use super::sanitize::{SEPARATOR, clean};
use std::fs;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// An open, readable and seekable file.
pub trait FileHandle: Read + Seek + Send {}

impl<T: Read + Seek + Send> FileHandle for T {}

/// The subset of file metadata the server needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the file.
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

impl FileInfo {
    pub fn from_metadata(path: &Path, meta: &fs::Metadata) -> Self {
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: meta.len(),
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            is_dir: meta.is_dir(),
        }
    }

    /// Modification time in whole seconds since the Unix epoch.
    ///
    /// Times before the epoch are negative.
    #[allow(clippy::cast_possible_wrap)]
    pub fn unix_modified(&self) -> i64 {
        match self.modified.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => {
                let before = e.duration();
                // Round towards negative infinity like integer Unix time
                let secs = before.as_secs() as i64;
                if before.subsec_nanos() > 0 {
                    -secs - 1
                } else {
                    -secs
                }
            }
        }
    }
}

/// Filesystem operations used by the resolver.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Entries of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Existing paths matching a glob pattern, in lexical order.
    ///
    /// Wildcards only expand within one path element. A pattern without
    /// metacharacters yields itself if it exists.
    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>> {
        glob::validate(pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        if !glob::has_meta(pattern) {
            return Ok(match self.stat(Path::new(pattern)) {
                Ok(_) => vec![PathBuf::from(pattern)],
                Err(_) => Vec::new(),
            });
        }

        let (dir, file) = match pattern.rfind(SEPARATOR) {
            Some(i) => (&pattern[..=i], &pattern[i + 1..]),
            None => ("", pattern),
        };
        let dir = match dir {
            "" => ".".to_string(),
            d if d.len() == SEPARATOR.len_utf8() => d.to_string(),
            d => clean(&d[..d.len() - SEPARATOR.len_utf8()]),
        };

        let mut matches = Vec::new();
        if glob::has_meta(&dir) && dir != pattern {
            for parent in self.glob(&dir)? {
                glob_in(self, &parent, file, &mut matches);
            }
        } else {
            glob_in(self, Path::new(&dir), file, &mut matches);
        }
        Ok(matches)
    }
}

/// Append entries of `dir` whose names match `pattern`.
///
/// Unreadable directories contribute nothing.
fn glob_in<F: FileSystem + ?Sized>(fs: &F, dir: &Path, pattern: &str, out: &mut Vec<PathBuf>) {
    let Ok(info) = fs.stat(dir) else { return };
    if !info.is_dir {
        return;
    }
    let Ok(entries) = fs.read_dir(dir) else { return };

    for entry in entries {
        if glob::matches(pattern, &entry.name).unwrap_or(false) {
            out.push(dir.join(&entry.name));
        }
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        Ok(FileInfo::from_metadata(path, &meta))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>> {
        let mut entries = fs::read_dir(path)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                let meta = entry.metadata().ok()?;
                Some(FileInfo::from_metadata(&path, &meta))
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

#[cfg(test)]
pub use mem::MemFs;

//! Secure static-file resolution.
//!
//! Turns an untrusted request path into the file to serve:
//!
//! ```text
//! request path
//!   → guard      reject obfuscated names (ADS, 8.3 short names)
//!   → sanitize   join onto the root without escaping it
//!   → stat       classify errors (classify)
//!   → index      directory → first visible index file
//!   → hidden     hidden files are reported as missing
//!   → method     GET / HEAD only
//!   → open       ETag + content type (metadata)
//! ```
//!
//! | Module     | Purpose                                          |
//! |------------|--------------------------------------------------|
//! | `classify` | filesystem error → not found / forbidden / other |
//! | `error`    | `ResolveError` and result codes                  |
//! | `fs`       | `FileSystem` capability, `OsFs`                  |
//! | `glob`     | glob matching for hide patterns                  |
//! | `guard`    | obfuscated-name rejection                        |
//! | `hidden`   | `HideList` matching                              |
//! | `index`    | directory index lookup                           |
//! | `metadata` | ETag, method check, content type                 |
//! | `replace`  | per-request placeholder substitution             |
//! | `sanitize` | traversal-safe path join                         |

pub mod classify;
pub mod error;
pub mod fs;
pub mod glob;
pub mod guard;
pub mod hidden;
pub mod index;
pub mod metadata;
pub mod replace;
pub mod sanitize;

pub use error::{RESULT_SUCCESS, ResolveError};
pub use fs::{FileHandle, FileInfo, FileSystem, OsFs};
pub use guard::PathGuard;
pub use hidden::HideList;
pub use metadata::{ALLOW, ContentType};
pub use replace::{Replacer, Substitute};

use crate::config::FilesConfig;
use crate::debug;
use std::path::{Path, PathBuf};

/// The parts of an HTTP request the resolver looks at.
#[derive(Debug, Clone, Copy)]
pub struct FileRequest<'a> {
    pub method: &'a str,
    /// URL-decoded request path.
    pub path: &'a str,
    /// `Content-Type` already chosen upstream, if any.
    pub content_type: Option<&'a str>,
}

/// A file ready to be streamed.
///
/// Dropping it closes the file.
pub struct ServedFile {
    pub path: PathBuf,
    pub info: FileInfo,
    pub file: Box<dyn FileHandle>,
    pub etag: String,
    pub content_type: ContentType,
}

impl std::fmt::Debug for ServedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServedFile")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("etag", &self.etag)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Resolver for one configuration generation.
///
/// Holds no per-request state; one instance may serve many threads.
pub struct FileServer<'a> {
    files: &'a FilesConfig,
    fs: &'a dyn FileSystem,
    guard: PathGuard,
}

impl<'a> FileServer<'a> {
    pub fn new(files: &'a FilesConfig, fs: &'a dyn FileSystem) -> Self {
        Self::with_guard(files, fs, PathGuard::host())
    }

    pub const fn with_guard(files: &'a FilesConfig, fs: &'a dyn FileSystem, guard: PathGuard) -> Self {
        Self { files, fs, guard }
    }

    /// Resolve and open the file for `request`.
    pub fn resolve(
        &self,
        request: &FileRequest<'_>,
        repl: &dyn Substitute,
    ) -> Result<ServedFile, ResolveError> {
        self.guard.check(request.path).map_err(ResolveError::IllegalPath)?;

        let (root, hide) = self.scope(repl)?;
        let mut filename = sanitize::sanitized_join(&root, request.path);

        debug!(
            "resolve";
            "sanitized path join: root={} request={} result={}",
            root,
            request.path,
            filename.display()
        );

        let mut info = self.stat(&filename)?;

        if info.is_dir
            && let Some((index_path, index_info)) = index::resolve_index(
                self.fs,
                &filename,
                &self.files.index_names,
                &hide,
                repl,
            )
        {
            filename = index_path;
            info = index_info;
        }

        if info.is_dir {
            debug!("resolve"; "no index file in {}", filename.display());
            return Err(ResolveError::NotFound);
        }

        // The index lookup may have changed the filename
        if hide.is_hidden(&filename) {
            debug!("resolve"; "hiding file {}", filename.display());
            return Err(ResolveError::NotFound);
        }

        metadata::check_method(request.method)?;

        debug!("resolve"; "opening file {}", filename.display());
        let file = self
            .fs
            .open(&filename)
            .map_err(|e| classify::into_resolve_error(self.fs, e, &filename))?;

        let etag = metadata::compute_etag(&info);
        let content_type = metadata::content_type(request.content_type, &filename);

        Ok(ServedFile {
            path: filename,
            info,
            file,
            etag,
            content_type,
        })
    }

    /// Body of the configured not-found page, if any.
    ///
    /// The page goes through the same root confinement and hide rules as
    /// any other file.
    pub fn not_found_page(&self, repl: &dyn Substitute) -> Option<Vec<u8>> {
        let page = self.files.not_found_page.as_deref()?;
        let (root, hide) = self.scope(repl).ok()?;
        let path = sanitize::sanitized_join(&root, page);

        if hide.is_hidden(&path) {
            return None;
        }
        self.fs.read_file(&path).ok()
    }

    /// Existing paths covered by path-style hide patterns.
    ///
    /// Placeholders are substituted with empty values.
    pub fn hidden_paths(&self) -> Vec<PathBuf> {
        // Empty values are always accepted
        let Some(hide) = HideList::from_templates(&self.files.hide, &Replacer::new()) else {
            return Vec::new();
        };
        hide.patterns()
            .iter()
            .filter(|p| p.contains(sanitize::SEPARATOR))
            .filter_map(|p| self.fs.glob(p).ok())
            .flatten()
            .collect()
    }

    /// Root and hide list for one request.
    ///
    /// A placeholder value that is not a single path element would let the
    /// request pick the root (or move a hide pattern), so such requests
    /// are answered as not found.
    fn scope(&self, repl: &dyn Substitute) -> Result<(String, HideList), ResolveError> {
        let Some(root) = repl.replace_path(&self.files.root, ".") else {
            debug!("resolve"; "placeholder value refused in root {}", self.files.root);
            return Err(ResolveError::NotFound);
        };
        let Some(hide) = HideList::from_templates(&self.files.hide, repl) else {
            debug!("resolve"; "placeholder value refused in hide patterns");
            return Err(ResolveError::NotFound);
        };
        Ok((root, hide))
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, ResolveError> {
        self.fs
            .stat(path)
            .map_err(|e| classify::into_resolve_error(self.fs, e, path))
    }
}

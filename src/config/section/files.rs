//! `[files]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [files]
//! root = "public"                         # Site root, may use placeholders
//! hide = [".git", "*.bak", "/srv/secret"] # Served as if missing
//! index_names = ["index.html", "index.txt"]
//! not_found_page = "/404.html"            # Relative to root
//! ```
//!
//! `root`, `hide` and `index_names` accept request placeholders such as
//! `{http.request.hostname}`.

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::fileserver::{glob, sanitize::SEPARATOR};
use serde::{Deserialize, Serialize};

/// Static file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory files are served from. Empty means the current directory.
    pub root: String,

    /// Hide patterns.
    ///
    /// A pattern without a separator matches any path component; one with a
    /// separator matches a path prefix. Both may use glob syntax.
    pub hide: Vec<String>,

    /// Index files tried, in order, for directory requests.
    pub index_names: Vec<String>,

    /// Page sent with 404 responses, resolved like a request path.
    pub not_found_page: Option<String>,
}

impl FilesConfig {
    const HIDE: FieldPath = FieldPath::new("files.hide");
    const INDEX_NAMES: FieldPath = FieldPath::new("files.index_names");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for pattern in &self.hide {
            if pattern.is_empty() {
                diag.error_with_hint(
                    Self::HIDE,
                    "empty pattern hides every file",
                    "remove the empty entry",
                );
            } else if let Err(e) = glob::validate(pattern) {
                diag.error(Self::HIDE, format!("`{pattern}`: {e}"));
            }
        }

        for name in &self.index_names {
            if name.is_empty() {
                diag.error(Self::INDEX_NAMES, "index name must not be empty");
            } else if name.contains(SEPARATOR) {
                diag.error_with_hint(
                    Self::INDEX_NAMES,
                    format!("`{name}` is a path, not a file name"),
                    "index names are looked up inside the requested directory",
                );
            }
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            hide: Vec::new(),
            index_names: vec!["index.html".to_string(), "index.txt".to_string()],
            not_found_page: None,
        }
    }
}

//! Hide-list matching.
//!
//! A hidden path is served as if it did not exist. Each pattern is tried
//! with three rules, any of which hides the path:
//!
//! 1. **Component**: a pattern without a separator is globbed against every
//!    component, so `bar` hides `/bar` and `/foo/bar/baz` but not
//!    `/barstool`.
//! 2. **Prefix**: a pattern with a separator hides everything below it, so
//!    `/foo` hides `/foo/bar` but not `/foobar`.
//! 3. **Glob**: the pattern is globbed against the whole path.
//!
//! Rules are OR-ed across patterns, so adding a pattern never un-hides a
//! path.

use super::glob;
use super::replace::Substitute;
use super::sanitize::SEPARATOR;
use crate::utils::path::absolutize;
use std::path::Path;

/// Per-request list of hide patterns, placeholders already substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HideList {
    patterns: Vec<String>,
}

impl HideList {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Build the list for one request from configured templates.
    ///
    /// Unknown placeholders become empty. Patterns containing a separator
    /// are made absolute so they compare against absolute file paths, and
    /// their placeholder values must be single path elements: `None` when a
    /// request value would point such a pattern at another directory.
    pub fn from_templates(templates: &[String], repl: &dyn Substitute) -> Option<Self> {
        let patterns = templates
            .iter()
            .map(|template| {
                if template.contains(SEPARATOR) {
                    let pattern = repl.replace_path(template, "")?;
                    Some(absolutize(Path::new(&pattern)).to_string_lossy().into_owned())
                } else {
                    Some(repl.replace_all(template, ""))
                }
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { patterns })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` must be treated as nonexistent.
    ///
    /// `path` is a filesystem path, not a request URI.
    pub fn is_hidden(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let absolute = absolutize(path);
        let filename = absolute.to_string_lossy();

        // Split lazily, at most once for all component patterns
        let mut components: Option<Vec<&str>> = None;

        for pattern in &self.patterns {
            if !pattern.contains(SEPARATOR) {
                let components =
                    components.get_or_insert_with(|| filename.split(SEPARATOR).collect());
                if components
                    .iter()
                    .any(|c| glob::matches(pattern, c).unwrap_or(false))
                {
                    return true;
                }
            } else if let Some(rest) = filename.strip_prefix(pattern.as_str())
                && (rest.is_empty() || rest.starts_with(SEPARATOR))
            {
                return true;
            }

            if glob::matches(pattern, &filename).unwrap_or(false) {
                return true;
            }
        }

        false
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::fileserver::replace::Replacer;

    fn hide(patterns: &[&str]) -> HideList {
        HideList::new(patterns.iter().map(|p| (*p).to_string()).collect())
    }

    #[test]
    fn test_empty_list_hides_nothing() {
        let list = HideList::default();
        assert!(!list.is_hidden(Path::new("/")));
        assert!(!list.is_hidden(Path::new("/etc/passwd")));
        assert!(!list.is_hidden(Path::new("relative/file")));
    }

    #[test]
    fn test_component_pattern() {
        let list = hide(&["bar"]);
        assert!(list.is_hidden(Path::new("/bar")));
        assert!(list.is_hidden(Path::new("/x/bar/y")));
        assert!(list.is_hidden(Path::new("/foo/bar/baz")));
        assert!(!list.is_hidden(Path::new("/barstool")));
        assert!(!list.is_hidden(Path::new("/foo/rebar")));
    }

    #[test]
    fn test_component_glob() {
        let list = hide(&[".*"]);
        assert!(list.is_hidden(Path::new("/site/.git/config")));
        assert!(list.is_hidden(Path::new("/site/.env")));
        assert!(!list.is_hidden(Path::new("/site/index.html")));

        let list = hide(&["*.bak"]);
        assert!(list.is_hidden(Path::new("/site/db.sqlite.bak")));
        assert!(!list.is_hidden(Path::new("/site/db.sqlite")));
    }

    #[test]
    fn test_prefix_pattern() {
        let list = hide(&["/foo"]);
        assert!(list.is_hidden(Path::new("/foo")));
        assert!(list.is_hidden(Path::new("/foo/bar")));
        assert!(list.is_hidden(Path::new("/foo/bar/baz.txt")));
        assert!(!list.is_hidden(Path::new("/foobar")));
        assert!(!list.is_hidden(Path::new("/bar/foo")));
    }

    #[test]
    fn test_whole_path_glob() {
        let list = hide(&["/site/*.key"]);
        assert!(list.is_hidden(Path::new("/site/server.key")));
        assert!(!list.is_hidden(Path::new("/site/keys/server.key")));
    }

    #[test]
    fn test_relative_path_is_absolutized() {
        let cwd = std::env::current_dir().unwrap();
        let secret = cwd.join("secret");
        let list = hide(&[secret.to_str().unwrap()]);
        assert!(list.is_hidden(Path::new("secret/token.txt")));
        assert!(list.is_hidden(Path::new("./a/../secret")));
        assert!(!list.is_hidden(Path::new("secrets")));
    }

    #[test]
    fn test_malformed_pattern_never_globs() {
        let list = hide(&["["]);
        assert!(!list.is_hidden(Path::new("/site/[")));
        assert!(!list.is_hidden(Path::new("/site/a")));

        // The literal prefix rule still applies to path patterns
        let list = hide(&["/site/["]);
        assert!(list.is_hidden(Path::new("/site/[")));
        assert!(list.is_hidden(Path::new("/site/[/inner")));
        assert!(!list.is_hidden(Path::new("/site/a")));
        assert!(!list.is_hidden(Path::new("/site/[a")));
    }

    #[test]
    fn test_adding_patterns_is_monotonic() {
        let paths = [
            "/site/index.html",
            "/site/.git/HEAD",
            "/site/private/a.txt",
            "/site/privateer.txt",
            "/site/notes.bak",
            "/barstool",
        ];
        let all = ["private", "/site/private", "*.bak", ".git", "[", "/site/*.txt"];

        for n in 0..all.len() {
            let smaller = hide(&all[..n]);
            let larger = hide(&all[..=n]);
            for path in paths {
                let path = Path::new(path);
                if smaller.is_hidden(path) {
                    assert!(larger.is_hidden(path), "{} un-hidden", path.display());
                }
            }
        }
    }

    #[test]
    fn test_from_templates() {
        let mut repl = Replacer::new();
        repl.set("http.request.host", "example.com");

        let templates = vec![
            "{http.request.host}.secret".to_string(),
            "/srv/{http.request.host}/private".to_string(),
            "{unknown}.bak".to_string(),
        ];
        let list = HideList::from_templates(&templates, &repl).unwrap();

        assert_eq!(
            list.patterns(),
            &[
                "example.com.secret".to_string(),
                "/srv/example.com/private".to_string(),
                ".bak".to_string(),
            ]
        );
        assert!(list.is_hidden(Path::new("/srv/example.com/private/a")));
        assert!(list.is_hidden(Path::new("/www/example.com.secret")));
    }

    #[test]
    fn test_from_templates_absolutizes_relative_paths() {
        let templates = vec!["private/keys".to_string()];
        let list = HideList::from_templates(&templates, &Replacer::new()).unwrap();

        let expected = std::env::current_dir().unwrap().join("private/keys");
        assert_eq!(list.patterns(), &[expected.to_string_lossy().into_owned()]);
        assert!(list.is_hidden(Path::new("private/keys/id_rsa")));
    }

    #[test]
    fn test_from_templates_refuses_moved_path_patterns() {
        let templates = vec![
            "*.{http.request.hostname}".to_string(),
            "/sites/{http.request.hostname}/private".to_string(),
        ];

        let repl = Replacer::for_request("GET", "/", [("Host", "example.com")]);
        assert!(HideList::from_templates(&templates, &repl).is_some());

        let repl = Replacer::for_request("GET", "/", [("Host", "../other")]);
        assert!(HideList::from_templates(&templates, &repl).is_none());

        // Component patterns never name a directory, so any value is kept
        let component = vec!["{http.request.hostname}".to_string()];
        let list = HideList::from_templates(&component, &repl).unwrap();
        assert_eq!(list.patterns(), &["../other".to_string()]);
    }
}

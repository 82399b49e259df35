//! Traversal-safe joining of request paths onto a trusted root.
//!
//! Everything here is lexical: no filesystem access, no symlink resolution.

use std::path::PathBuf;

/// Platform path separator.
pub const SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Join an untrusted `request_path` onto a trusted `root`.
///
/// The request is rooted at `/` and cleaned on its own before the join, so
/// `..` segments are resolved against the request only and can never climb
/// above `root`. An empty root means the current directory.
///
/// Cleaning strips trailing separators; a request ending in `/` gets its
/// trailing separator back unless it is the bare root (`/`), because index
/// resolution needs to know that a directory was asked for.
pub fn sanitized_join(root: &str, request_path: &str) -> PathBuf {
    let root = if root.is_empty() { "." } else { root };

    let request = clean(&format!("/{request_path}"));
    let mut joined = clean(&format!("{root}{SEPARATOR}{request}"));

    if request_path.ends_with('/') && request_path.len() > 1 {
        joined.push(SEPARATOR);
    }

    PathBuf::from(joined)
}

/// Lexically clean a path.
///
/// - repeated separators collapse into one
/// - `.` elements are dropped
/// - `..` removes the preceding element; at the start of a rooted path it
///   is dropped, at the start of a relative path it is kept
/// - an empty result becomes `.`
///
/// Both `/` and the platform separator are accepted as input separators,
/// the output always uses [`SEPARATOR`].
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with(is_separator);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(is_separator) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let sep = SEPARATOR.to_string();
    let body = parts.join(&sep);
    match (rooted, body.is_empty()) {
        (true, _) => format!("{SEPARATOR}{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[inline]
fn is_separator(c: char) -> bool {
    c == '/' || c == SEPARATOR
}

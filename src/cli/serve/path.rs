//! Request URL to request path.

use percent_encoding::percent_decode_str;

/// Extract the decoded request path from a request target.
///
/// The query string is dropped before decoding, so `%3F` stays part of the
/// path. Slashes are kept as sent (a trailing slash marks a directory
/// request) and a leading slash is added when missing. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn request_path(url: &str) -> String {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(raw).decode_utf8_lossy();

    if decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    }
}

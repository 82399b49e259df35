//! Response metadata: validators, method policy and content type.

use super::error::ResolveError;
use super::fs::FileInfo;
use crate::utils::mime;
use std::path::Path;

/// Value of the `Allow` header on 405 responses.
pub const ALLOW: &str = "GET, HEAD";

/// Strong ETag derived from modification time and size.
///
/// File contents are never read, so two files sharing both values share an
/// ETag. Prefix with `W/` to turn it into a weak validator.
pub fn compute_etag(info: &FileInfo) -> String {
    let modified = base36(i128::from(info.unix_modified()));
    let size = base36(i128::from(info.size));
    format!("\"{modified}{size}\"")
}

/// Static files are only served to `GET` and `HEAD`.
pub fn check_method(method: &str) -> Result<(), ResolveError> {
    match method {
        "GET" | "HEAD" => Ok(()),
        _ => Err(ResolveError::MethodNotAllowed),
    }
}

/// What to do with the `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// A content type was already set upstream.
    Keep,
    Set(&'static str),
    /// Unknown extension: send no content type and forbid sniffing.
    Suppress,
}

/// Decide the content type from the file extension, unless one is set.
pub fn content_type(existing: Option<&str>, path: &Path) -> ContentType {
    if existing.is_some_and(|ct| !ct.is_empty()) {
        return ContentType::Keep;
    }
    match mime::lookup(path) {
        Some(ct) => ContentType::Set(ct),
        None => ContentType::Suppress,
    }
}

/// Signed base-36 formatting (lowercase digits).
fn base36(value: i128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let negative = value < 0;
    let mut n = value.unsigned_abs();
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if negative {
        buf.push(b'-');
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

//! Per-request `{placeholder}` substitution.
//!
//! The resolver never knows where values come from; it only sees the
//! [`Substitute`] trait. [`Replacer`] is the request-backed implementation.
//!
//! | Placeholder                    | Value                          |
//! |--------------------------------|--------------------------------|
//! | `{http.request.method}`        | request method                 |
//! | `{http.request.host}`          | `Host` header, port included   |
//! | `{http.request.hostname}`      | `Host` header without port     |
//! | `{http.request.uri.path}`      | decoded request path           |
//! | `{http.request.header.<Name>}` | any request header (any case)  |

use rustc_hash::FxHashMap;

const HEADER_PREFIX: &str = "http.request.header.";

/// String substitution injected into the resolver.
pub trait Substitute {
    /// Value of `key`, if set and not empty.
    fn value(&self, key: &str) -> Option<&str>;

    /// Replace every `{key}` in `input`.
    ///
    /// Unknown keys and keys with empty values are replaced with `empty`.
    fn replace_all(&self, input: &str, empty: &str) -> String {
        expand(input, |key| Some(self.value(key).unwrap_or(empty))).unwrap_or_default()
    }

    /// Replace every `{key}` in a filesystem path template.
    ///
    /// Each substituted value must be a single path element. Returns `None`
    /// when one contains a separator or is `.` or `..`, so request data can
    /// never move the path to another directory.
    fn replace_path(&self, input: &str, empty: &str) -> Option<String> {
        expand(input, |key| match self.value(key) {
            Some(value) if !is_path_element(value) => None,
            value => Some(value.unwrap_or(empty)),
        })
    }
}

/// Expand placeholders, stopping at the first value `lookup` refuses.
fn expand<'v>(input: &str, mut lookup: impl FnMut(&str) -> Option<&'v str>) -> Option<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        // `\{` stays a literal brace
        if rest[..open].ends_with('\\') {
            out.push_str(&rest[..open - 1]);
            out.push('{');
            rest = &rest[open + 1..];
            continue;
        }

        let Some(close) = rest[open..].find('}') else {
            break;
        };

        out.push_str(&rest[..open]);
        out.push_str(lookup(&rest[open + 1..open + close])?);
        rest = &rest[open + close + 1..];
    }

    out.push_str(rest);
    Some(out)
}

/// Whether `value` names exactly one directory entry.
///
/// Both `/` and `\` count as separators on every platform.
fn is_path_element(value: &str) -> bool {
    value != "." && value != ".." && !value.contains(['/', '\\', '\0'])
}

/// Placeholder values for one request.
#[derive(Debug, Clone, Default)]
pub struct Replacer {
    values: FxHashMap<String, String>,
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect placeholder values from request parts.
    pub fn for_request<'a>(
        method: &str,
        path: &str,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut repl = Self::new();
        repl.set("http.request.method", method);
        repl.set("http.request.uri.path", path);

        for (name, value) in headers {
            if name.eq_ignore_ascii_case("host") {
                repl.set("http.request.host", value);
                repl.set("http.request.hostname", strip_port(value));
            }
            repl.set(&format!("{HEADER_PREFIX}{}", name.to_ascii_lowercase()), value);
        }

        repl
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

}

impl Substitute for Replacer {
    fn value(&self, key: &str) -> Option<&str> {
        let value = match key.strip_prefix(HEADER_PREFIX) {
            Some(name) => self
                .values
                .get(&format!("{HEADER_PREFIX}{}", name.to_ascii_lowercase())),
            None => self.values.get(key),
        };
        value.map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// `example.com:8080` → `example.com`, `[::1]:80` → `[::1]`.
fn strip_port(host: &str) -> &str {
    match host.rfind(':') {
        Some(i) if !host[i..].contains(']') => &host[..i],
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_known() {
        let mut repl = Replacer::new();
        repl.set("http.request.host", "example.com");
        assert_eq!(
            repl.replace_all("/srv/{http.request.host}/www", ""),
            "/srv/example.com/www"
        );
    }

    #[test]
    fn test_replace_unknown_uses_empty() {
        let repl = Replacer::new();
        assert_eq!(repl.replace_all("{nope}", "."), ".");
        assert_eq!(repl.replace_all("a{nope}b", ""), "ab");
    }

    #[test]
    fn test_replace_empty_value_uses_empty() {
        let mut repl = Replacer::new();
        repl.set("k", "");
        assert_eq!(repl.replace_all("{k}", "."), ".");
    }

    #[test]
    fn test_replace_literals() {
        let repl = Replacer::new();
        assert_eq!(repl.replace_all("no placeholders", ""), "no placeholders");
        assert_eq!(repl.replace_all("open { only", ""), "open { only");
        assert_eq!(repl.replace_all("\\{literal}", ""), "{literal}");
        assert_eq!(repl.replace_all("[a-z]*.txt", ""), "[a-z]*.txt");
    }

    #[test]
    fn test_for_request() {
        let headers = [("Host", "example.com:8080"), ("X-Tenant", "acme")];
        let repl = Replacer::for_request("GET", "/a/b", headers);

        assert_eq!(repl.replace_all("{http.request.method}", ""), "GET");
        assert_eq!(repl.replace_all("{http.request.uri.path}", ""), "/a/b");
        assert_eq!(repl.replace_all("{http.request.host}", ""), "example.com:8080");
        assert_eq!(repl.replace_all("{http.request.hostname}", ""), "example.com");
        assert_eq!(repl.replace_all("{http.request.header.x-tenant}", ""), "acme");
        assert_eq!(repl.replace_all("{http.request.header.X-TENANT}", ""), "acme");
    }

    #[test]
    fn test_replace_path_accepts_single_elements() {
        let headers = [("Host", "example.com:8080")];
        let repl = Replacer::for_request("GET", "/", headers);

        assert_eq!(
            repl.replace_path("/sites/{http.request.hostname}", ".").as_deref(),
            Some("/sites/example.com")
        );
        assert_eq!(
            repl.replace_path("/sites/{http.request.host}", ".").as_deref(),
            Some("/sites/example.com:8080")
        );
        // Unset values fall back to the configured default
        assert_eq!(
            repl.replace_path("{http.request.header.x-site}", ".").as_deref(),
            Some(".")
        );
        assert_eq!(repl.replace_path("public", ".").as_deref(), Some("public"));
    }

    #[test]
    fn test_replace_path_refuses_traversal_values() {
        for host in ["..", ".", "../etc", "a/b", "..\\windows", "/etc"] {
            let repl = Replacer::for_request("GET", "/passwd", [("Host", host)]);
            assert_eq!(
                repl.replace_path("/sites/{http.request.hostname}", "."),
                None,
                "{host}"
            );
            // Plain substitution is unchanged
            assert!(repl.replace_all("/sites/{http.request.hostname}", ".").contains(host));
        }

        // The request path always carries separators
        let repl = Replacer::for_request("GET", "/a/b", std::iter::empty());
        assert_eq!(repl.replace_path("/srv/{http.request.uri.path}", ""), None);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:80"), "example.com");
        assert_eq!(strip_port("[::1]:80"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
    }
}

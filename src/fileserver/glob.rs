//! Shell-style glob matching for hide patterns.
//!
//! Supported syntax:
//!
//! | Pattern   | Matches                                          |
//! |-----------|--------------------------------------------------|
//! | `*`       | any run of non-separator characters              |
//! | `?`       | one non-separator character                      |
//! | `[a-z]`   | one character in the class (`[^...]` negates)    |
//! | `\c`      | the literal `c` (not on Windows, where `\` separates) |
//!
//! Wildcards never cross a path separator, so `/srv/*` matches
//! `/srv/a` but not `/srv/a/b`.

use super::sanitize::SEPARATOR;
use thiserror::Error;

/// The pattern is syntactically malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("syntax error in pattern")]
pub struct BadPattern;

/// Report whether `name` matches the whole of `pattern`.
pub fn matches(pattern: &str, name: &str) -> Result<bool, BadPattern> {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let mut name = name.as_slice();
    let mut rest = pattern.as_slice();

    'pattern: while !rest.is_empty() {
        let (star, chunk, tail) = scan_chunk(rest);
        rest = tail;

        // Trailing `*` matches the rest of the name unless a separator follows
        if star && chunk.is_empty() {
            return Ok(!name.contains(&SEPARATOR));
        }

        // Look for a match at the current position
        match match_chunk(chunk, name)? {
            Some(t) if t.is_empty() || !rest.is_empty() => {
                name = t;
                continue;
            }
            _ => {}
        }

        // With a leading star, retry the chunk at every later position
        if star {
            let mut i = 0;
            while i < name.len() && name[i] != SEPARATOR {
                if let Some(t) = match_chunk(chunk, &name[i + 1..])? {
                    // Last chunk must consume the whole name
                    if rest.is_empty() && !t.is_empty() {
                        i += 1;
                        continue;
                    }
                    name = t;
                    continue 'pattern;
                }
                i += 1;
            }
        }

        // No match; still report malformed syntax in the remaining pattern
        while !rest.is_empty() {
            let (_, chunk, tail) = scan_chunk(rest);
            rest = tail;
            match_chunk(chunk, &[])?;
        }
        return Ok(false);
    }

    Ok(name.is_empty())
}

/// Check pattern syntax without matching anything in particular.
pub fn validate(pattern: &str) -> Result<(), BadPattern> {
    matches(pattern, "").map(|_| ())
}

/// Whether `pattern` contains any glob metacharacters.
pub fn has_meta(pattern: &str) -> bool {
    let magic: &[char] = if cfg!(windows) {
        &['*', '?', '[']
    } else {
        &['*', '?', '[', '\\']
    };
    pattern.contains(magic)
}

/// Split off the next chunk: leading stars, then everything up to the next
/// star outside a character class.
fn scan_chunk(mut pattern: &[char]) -> (bool, &[char], &[char]) {
    let mut star = false;
    while let Some(('*', tail)) = pattern.split_first() {
        pattern = tail;
        star = true;
    }

    let mut in_range = false;
    let mut i = 0;
    while i < pattern.len() {
        match pattern[i] {
            '\\' if !cfg!(windows) => {
                // Skip the escaped character
                if i + 1 < pattern.len() {
                    i += 1;
                }
            }
            '[' => in_range = true,
            ']' => in_range = false,
            '*' if !in_range => break,
            _ => {}
        }
        i += 1;
    }

    (star, &pattern[..i], &pattern[i..])
}

/// Match a star-free chunk against the start of `s`.
///
/// Returns the unmatched remainder of `s` on success. The whole chunk is
/// always walked so syntax errors surface even after a mismatch.
fn match_chunk<'a>(mut chunk: &[char], mut s: &'a [char]) -> Result<Option<&'a [char]>, BadPattern> {
    let mut failed = false;

    while let Some((&head, tail)) = chunk.split_first() {
        if !failed && s.is_empty() {
            failed = true;
        }

        match head {
            '[' => {
                let mut r = '\0';
                if !failed {
                    r = s[0];
                    s = &s[1..];
                }
                chunk = tail;

                let mut negated = false;
                if let Some(('^', t)) = chunk.split_first() {
                    negated = true;
                    chunk = t;
                }

                let mut matched = false;
                let mut ranges = 0;
                loop {
                    if let Some((']', t)) = chunk.split_first()
                        && ranges > 0
                    {
                        chunk = t;
                        break;
                    }
                    let (lo, t) = get_escaped(chunk)?;
                    chunk = t;
                    let mut hi = lo;
                    if let Some(('-', t)) = chunk.split_first() {
                        let (h, t) = get_escaped(t)?;
                        hi = h;
                        chunk = t;
                    }
                    if lo <= r && r <= hi {
                        matched = true;
                    }
                    ranges += 1;
                }

                if matched == negated {
                    failed = true;
                }
            }
            '?' => {
                if !failed {
                    if s[0] == SEPARATOR {
                        failed = true;
                    }
                    s = &s[1..];
                }
                chunk = tail;
            }
            _ => {
                let literal = if head == '\\' && !cfg!(windows) {
                    match tail.split_first() {
                        Some((&c, t)) => {
                            chunk = t;
                            c
                        }
                        None => return Err(BadPattern),
                    }
                } else {
                    chunk = tail;
                    head
                };
                if !failed {
                    if literal != s[0] {
                        failed = true;
                    }
                    s = &s[1..];
                }
            }
        }
    }

    Ok(if failed { None } else { Some(s) })
}

/// Read one possibly-escaped character of a character class.
fn get_escaped(chunk: &[char]) -> Result<(char, &[char]), BadPattern> {
    let mut chunk = match chunk.first() {
        None | Some('-' | ']') => return Err(BadPattern),
        Some(_) => chunk,
    };

    if chunk[0] == '\\' && !cfg!(windows) {
        chunk = &chunk[1..];
        if chunk.is_empty() {
            return Err(BadPattern);
        }
    }

    let (c, rest) = (chunk[0], &chunk[1..]);
    // A class must be closed by `]`
    if rest.is_empty() {
        return Err(BadPattern);
    }
    Ok((c, rest))
}

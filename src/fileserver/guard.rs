//! Rejection of filename-obfuscation tricks before any filesystem access.
//!
//! On Windows a file can be reached under names the hide list never sees:
//! `secret.txt::$DATA` (alternate data streams), `SECRE~1.TXT` (8.3 short
//! names) or `secret.txt. ` (trailing dots and spaces are ignored). Such
//! requests are refused outright.

use thiserror::Error;

/// Longest 8.3 short name: eight characters, a dot, three characters.
const SHORT_NAME_MAX: usize = 12;

/// Why a request path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("illegal ADS path")]
    AlternateDataStream,

    #[error("illegal short name")]
    ShortName,
}

/// Obfuscation policy, chosen once for the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGuard {
    /// Accepts every path.
    Permissive,
    /// Rejects alternate-data-stream and short-name paths.
    Windows,
}

impl PathGuard {
    /// Policy for the platform this binary was built for.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Permissive
        }
    }

    /// Check a raw request path.
    pub fn check(self, request_path: &str) -> Result<(), Rejection> {
        match self {
            Self::Permissive => Ok(()),
            Self::Windows => check_windows(request_path),
        }
    }
}

fn check_windows(request_path: &str) -> Result<(), Rejection> {
    if request_path.contains(':') {
        return Err(Rejection::AlternateDataStream);
    }

    let trimmed = request_path.trim_end_matches(['.', ' ']);
    if base_name(trimmed).chars().count() <= SHORT_NAME_MAX && trimmed.contains('~') {
        return Err(Rejection::ShortName);
    }

    Ok(())
}

/// Last `/`-separated element, ignoring trailing slashes.
fn base_name(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return "/";
    }
    path.rsplit('/').next().unwrap_or(path)
}

//! Terminal outcomes of a file request.

use super::guard::Rejection;
use std::io;
use thiserror::Error;

/// Closed error classification attached to every failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalRequestPath,
    NotFound,
    PermissionDenied,
    MethodNotAllowed,
    Internal,
}

/// Result code for a successful request.
pub const RESULT_SUCCESS: &str = "";

/// Every failure result code the server can produce.
pub const RESULTS: [&str; 6] = [
    "illegalADSPath",
    "illegalShortName",
    "methodNotAllowed",
    "notFound",
    "errPermission",
    "errHandleFile",
];

/// Why a request could not be served.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}")]
    IllegalPath(Rejection),

    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied(#[source] io::Error),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(#[source] io::Error),
}

impl ResolveError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalPath(_) => ErrorKind::IllegalRequestPath,
            Self::NotFound => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Result code reported to the host.
    pub const fn result_code(&self) -> &'static str {
        match self {
            Self::IllegalPath(Rejection::AlternateDataStream) => RESULTS[0],
            Self::IllegalPath(Rejection::ShortName) => RESULTS[1],
            Self::MethodNotAllowed => RESULTS[2],
            Self::NotFound => RESULTS[3],
            Self::PermissionDenied(_) => RESULTS[4],
            Self::Internal(_) => RESULTS[5],
        }
    }

    /// HTTP status code for the response.
    pub const fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::IllegalRequestPath => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::PermissionDenied => 403,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::Internal => 500,
        }
    }
}

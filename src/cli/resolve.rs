//! `staticgate resolve`: run one request through the resolver.
//!
//! Useful for checking hide rules and index lookup without starting the
//! server. Nothing is read beyond file metadata.

use crate::config::ServerConfig;
use crate::fileserver::{
    ContentType, FileRequest, FileServer, OsFs, RESULT_SUCCESS, Replacer, ResolveError,
    ServedFile,
};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Resolve `path` and print the outcome.
///
/// Returns whether a file would be served.
pub fn run_resolve(
    config: &ServerConfig,
    path: &str,
    method: &str,
    host: Option<&str>,
) -> Result<bool> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let headers = host.map(|h| ("Host", h));
    let repl = Replacer::for_request(method, &path, headers);

    let server = FileServer::new(&config.files, &OsFs);
    let request = FileRequest {
        method,
        path: &path,
        content_type: None,
    };

    let outcome = server.resolve(&request, &repl);
    print!("{}", format_outcome(&outcome)?);
    Ok(outcome.is_ok())
}

fn format_outcome(outcome: &Result<ServedFile, ResolveError>) -> Result<String> {
    let mut out = String::new();
    match outcome {
        Ok(served) => {
            writeln!(out, "{} {}", "200".green().bold(), "ok".dimmed())?;
            writeln!(out, "result: {:?}", RESULT_SUCCESS)?;
            writeln!(out, "file:   {}", served.path.display())?;
            writeln!(out, "size:   {}", served.info.size)?;
            writeln!(out, "etag:   {}", served.etag)?;
            match served.content_type {
                ContentType::Set(mime) => writeln!(out, "type:   {mime}")?,
                ContentType::Suppress => writeln!(out, "type:   (none, nosniff)")?,
                ContentType::Keep => writeln!(out, "type:   (upstream)")?,
            }
        }
        Err(err) => {
            writeln!(out, "{} {}", err.status().to_string().red().bold(), err)?;
            writeln!(out, "result: {:?}", err.result_code())?;
        }
    }
    Ok(out)
}

//! Static file server.

mod lifecycle;
mod path;
mod response;

use crate::{
    config::{ServerConfig, cfg, watch},
    debug,
    fileserver::{FileRequest, FileServer, OsFs, ResolveError, Replacer},
    log,
    utils::mime,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let config = cfg();
        audit_hidden(&config);

        let watcher = if config.serve.watch && config.config_path.is_file() {
            Some(watch::spawn_watcher(config.config_path.clone(), self.shutdown_rx)?)
        } else {
            None
        };

        run_request_loop(&self.server, config.serve.workers)?;
        lifecycle::wait_for_shutdown(watcher);
        Ok(())
    }
}

/// Log the existing files that path-style hide patterns cover.
fn audit_hidden(config: &ServerConfig) {
    let paths = FileServer::new(&config.files, &OsFs).hidden_paths();
    if paths.is_empty() {
        return;
    }
    log!("hide"; "{} existing path(s) will be hidden", paths.len());
    for path in &paths {
        debug!("hide"; "{}", path.display());
    }
}

fn run_request_loop(server: &Server, workers: usize) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to create request worker pool")?;

    for request in server.incoming_requests() {
        pool.spawn(move || {
            if let Err(e) = handle_request(request) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Each request sees one config generation even across reloads
    let config = cfg();
    let path = path::request_path(request.url());
    let method = request.method().as_str().to_string();

    let repl = Replacer::for_request(
        &method,
        &path,
        request
            .headers()
            .iter()
            .map(|h| (h.field.as_str().as_str(), h.value.as_str())),
    );

    let server = FileServer::new(&config.files, &OsFs);
    let file_request = FileRequest {
        method: &method,
        path: &path,
        content_type: None,
    };

    match server.resolve(&file_request, &repl) {
        Ok(served) => {
            debug!("serve"; "{} {} -> {}", method, path, served.path.display());
            response::respond_file(request, served)
        }
        Err(err) => {
            if let ResolveError::Internal(source) = &err {
                log!("error"; "{} {}: {}", method, path, source);
            } else {
                debug!("serve"; "{} {} -> {}", method, path, err.result_code());
            }

            let page = matches!(err, ResolveError::NotFound)
                .then(|| server.not_found_page(&repl))
                .flatten()
                .map(|body| (body, not_found_type(&config)));
            response::respond_error(request, &err, page)
        }
    }
}

fn not_found_type(config: &ServerConfig) -> &'static str {
    config
        .files
        .not_found_page
        .as_deref()
        .and_then(|page| mime::lookup(std::path::Path::new(page)))
        .unwrap_or(mime::types::HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;

    #[test]
    fn test_not_found_type() {
        let mut config = ServerConfig::default();
        assert_eq!(not_found_type(&config), mime::types::HTML);

        config.files = FilesConfig {
            not_found_page: Some("errors/404.txt".to_string()),
            ..FilesConfig::default()
        };
        assert_eq!(not_found_type(&config), mime::types::PLAIN);

        config.files.not_found_page = Some("errors/404".to_string());
        assert_eq!(not_found_type(&config), mime::types::HTML);
    }
}

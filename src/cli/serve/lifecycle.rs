//! Server lifecycle management.

use crate::{core::register_server, log};
use anyhow::{Result, bail};
use crossbeam::channel::Sender;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                // Port 0 lets the OS choose; report what was actually bound
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, bound.port());
                }
                return Ok((server, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => bail!(
            "failed to bind {} after {} attempts starting at port {}: {}",
            interface,
            MAX_PORT_RETRIES,
            base_port,
            e
        ),
        None => bail!("no port available at or above {}", base_port),
    }
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler set up in main() unblocks the
/// server and stops the config watcher.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Wait for the config watcher to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_reports_bound_port_and_retries() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (first, addr) = bind_with_retry(localhost, 0).unwrap();
        let taken = first.server_addr().to_ip().unwrap().port();
        let (second, next) = bind_with_retry(localhost, taken).unwrap();

        assert_ne!(taken, 0);
        assert_eq!(addr.port(), taken);
        assert_ne!(next.port(), taken);
        assert_eq!(Some(next), second.server_addr().to_ip());
    }

    #[test]
    fn test_wait_for_finished_thread() {
        let handle = thread::spawn(|| {});
        wait_for_shutdown(Some(handle));
        wait_for_shutdown(None);
    }
}

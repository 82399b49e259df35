//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! workers = 4                 # Request worker threads
//! watch = true                # Reload this file when it changes
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Request worker threads.
    pub workers: usize,

    /// Reload the config file on change.
    pub watch: bool,
}

impl ServeConfig {
    const PORT: FieldPath = FieldPath::new("serve.port");
    const WORKERS: FieldPath = FieldPath::new("serve.workers");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error_with_hint(Self::PORT, "port must not be 0", "pick a port such as 8080");
        }
        if self.workers == 0 {
            diag.error(Self::WORKERS, "at least one worker is required");
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            workers: std::thread::available_parallelism().map_or(4, usize::from),
            watch: true,
        }
    }
}

//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! Each request loads one generation and keeps it until the response is
//! sent, so a reload never changes rules halfway through a request.

use crate::config::ServerConfig;
use anyhow::{Result, bail};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<ServerConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ServerConfig::default()));

/// Global hash of the current config file content.
static CONFIG_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn cfg() -> Arc<ServerConfig> {
    CONFIG.load_full()
}

/// Reload config from disk if content changed.
///
/// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged.
/// On error the current generation stays active.
pub fn reload_config() -> Result<bool> {
    use std::fs;

    let c = cfg();
    let Some(cli) = c.cli else {
        bail!("config was not loaded from the command line");
    };

    let content = fs::read_to_string(&c.config_path)?;
    let new_hash = crate::utils::hash::compute(content.as_bytes());

    let old_hash = CONFIG_HASH.load(Ordering::Relaxed);
    if new_hash == old_hash {
        return Ok(false);
    }

    let new_config = ServerConfig::load(cli)?;
    CONFIG.store(Arc::new(new_config));
    CONFIG_HASH.store(new_hash, Ordering::Relaxed);

    Ok(true)
}

#[inline]
pub fn init_config(config: ServerConfig) -> Arc<ServerConfig> {
    use std::fs;

    if config.config_path.exists()
        && let Ok(content) = fs::read_to_string(&config.config_path)
    {
        let hash = crate::utils::hash::compute(content.as_bytes());
        CONFIG_HASH.store(hash, Ordering::Relaxed);
    }

    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}

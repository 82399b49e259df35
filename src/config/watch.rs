//! Config file watcher.
//!
//! Watches the directory holding the config file (editors often replace the
//! file instead of writing it in place) and reloads the global config after
//! a burst of changes settles.

use crate::config::reload_config;
use crate::{debug, log};
use crossbeam::channel::{self, Receiver};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Quiet period before a change is applied.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Start watching `config_path` until `shutdown_rx` fires.
pub fn spawn_watcher(
    config_path: PathBuf,
    shutdown_rx: Receiver<()>,
) -> notify::Result<JoinHandle<()>> {
    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;

    let dir = config_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    debug!("watch"; "watching {}", config_path.display());

    Ok(thread::spawn(move || {
        // Dropping the watcher stops event delivery
        let _watcher = watcher;
        run(&config_path, &rx, &shutdown_rx);
    }))
}

fn run(config_path: &Path, rx: &Receiver<notify::Result<Event>>, shutdown_rx: &Receiver<()>) {
    loop {
        channel::select! {
            recv(shutdown_rx) -> _ => return,
            recv(rx) -> msg => {
                let Ok(res) = msg else { return };
                match res {
                    Ok(event) if touches(&event, config_path) => {
                        settle(rx);
                        apply_reload();
                    }
                    Ok(_) => {}
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        }
    }
}

/// Whether `event` may have changed the config file.
fn touches(event: &Event, config_path: &Path) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    let name = config_path.file_name();
    event.paths.iter().any(|p| p.file_name() == name)
}

/// Drain events until none arrive for one debounce period.
fn settle(rx: &Receiver<notify::Result<Event>>) {
    while rx.recv_timeout(DEBOUNCE).is_ok() {}
}

fn apply_reload() {
    match reload_config() {
        Ok(true) => log!("config"; "reloaded"),
        Ok(false) => debug!("config"; "unchanged, skipping reload"),
        Err(e) => log!("error"; "reload failed, keeping previous config: {:#}", e),
    }
}

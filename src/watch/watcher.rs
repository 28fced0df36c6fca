// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::watch::debounce::Debouncer;
use crate::watch::event::normalize;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes the given `root` directory
/// recursively and feeds normalized events into the debouncer.
///
/// The notify callback runs on the backend's own thread; `Debouncer::notify`
/// is a lock-guarded table insert, so calling it from there directly is fine
/// and keeps delivery latency out of the async runtime.
pub fn spawn_watcher(root: impl Into<PathBuf>, debouncer: Debouncer) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    let mut watcher = RecommendedWatcher::new(
        {
            let debouncer = debouncer.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for raw in normalize(&event) {
                        debug!(
                            name = %raw.name,
                            kind = %raw.kind,
                            path = %raw.path.display(),
                            "raw change observed"
                        );
                        debouncer.notify(raw);
                    }
                }
                Err(err) => {
                    // tracing is not reliably usable from the backend thread.
                    eprintln!("relaywatch: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle { _inner: watcher })
}

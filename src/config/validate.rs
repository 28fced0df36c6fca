// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - the watch root exists and is a directory
/// - integration and publish roots are non-empty paths
/// - `debounce_window_ms >= 1`
///
/// It does **not**:
/// - create missing integration/publish roots (handlers create destination
///   directories on demand)
/// - verify that `publish_root` is a version-control working copy (checked
///   lazily when the first conversion publishes)
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_roots(cfg)?;
    validate_watch_tuning(cfg)?;
    Ok(())
}

fn validate_roots(cfg: &ConfigFile) -> Result<()> {
    let watch_root = &cfg.paths.watch_root;
    if watch_root.as_os_str().is_empty() {
        return Err(anyhow!("[paths].watch_root must not be empty"));
    }
    if !watch_root.is_dir() {
        return Err(anyhow!(
            "[paths].watch_root {:?} does not exist or is not a directory",
            watch_root
        ));
    }

    if cfg.paths.integration_root.as_os_str().is_empty() {
        return Err(anyhow!("[paths].integration_root must not be empty"));
    }
    if cfg.paths.publish_root.as_os_str().is_empty() {
        return Err(anyhow!("[paths].publish_root must not be empty"));
    }

    Ok(())
}

fn validate_watch_tuning(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.debounce_window_ms == 0 {
        return Err(anyhow!("[watch].debounce_window_ms must be >= 1 (got 0)"));
    }
    Ok(())
}

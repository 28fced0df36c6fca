// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// watch_root = "C:/audio/work"
/// integration_root = "C:/svn/integration"
/// publish_root = "C:/svn/sound-design"
///
/// [watch]
/// exclusion_marker = "_postfix"
/// debounce_window_ms = 100
///
/// [svn]
/// enabled = true
/// username = "builder"
/// ```
///
/// The legacy key names from the original service configuration are accepted
/// as aliases (`FolderPath`, `IntegrationSvnPath`, `SoundDesignerSvnPath`,
/// `ExclusionMarker`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Required directory roots from `[paths]`.
    pub paths: PathsSection,

    /// Debounce and dispatch tuning from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// Version-control publishing settings from `[svn]`.
    #[serde(default)]
    pub svn: SvnSection,
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Root directory to watch, recursively.
    #[serde(alias = "FolderPath")]
    pub watch_root: PathBuf,

    /// Destination root for file copies and directory mirrors.
    #[serde(alias = "IntegrationSvnPath")]
    pub integration_root: PathBuf,

    /// Destination root for converted video output.
    #[serde(alias = "SoundDesignerSvnPath")]
    pub publish_root: PathBuf,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Substring that suppresses all handling for any path containing it.
    ///
    /// Matched case-insensitively against the full path.
    #[serde(default, alias = "ExclusionMarker")]
    pub exclusion_marker: Option<String>,

    /// Debounce window in milliseconds; bursts of events for the same entry
    /// inside this window collapse into one action.
    #[serde(default = "default_debounce_window_ms")]
    pub debounce_window_ms: u64,

    /// Cap on conversions running at the same time.
    #[serde(default = "default_max_concurrent_conversions")]
    pub max_concurrent_conversions: usize,
}

fn default_debounce_window_ms() -> u64 {
    100
}

fn default_max_concurrent_conversions() -> usize {
    4
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            exclusion_marker: None,
            debounce_window_ms: default_debounce_window_ms(),
            max_concurrent_conversions: default_max_concurrent_conversions(),
        }
    }
}

/// `[svn]` section.
///
/// When `enabled` is false, converted files are still written to
/// `publish_root` but no version-control calls are made.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SvnSection {
    /// Whether to add + commit converted output to the working copy.
    #[serde(default)]
    pub enabled: bool,

    /// Repository URL used to check out `publish_root` if it is not already
    /// a working copy. Optional; without it an existing working copy is
    /// required.
    #[serde(default)]
    pub repo_url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl WatchSection {
    /// Debounce window as a `Duration`.
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    /// Effective conversion cap, never zero.
    pub fn effective_max_conversions(&self) -> usize {
        self.max_concurrent_conversions.max(1)
    }
}

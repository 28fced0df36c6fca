// src/watch/event.rs

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

/// Kind of logical change reported by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Renamed,
    Deleted,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Changed => "changed",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One normalized notification from the event source.
///
/// Immutable once produced. `name` is the entry's base name at the time the
/// event was observed and serves as the coalescing key in the debouncer.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub path: PathBuf,
    pub name: String,
    pub kind: ChangeKind,
    /// Previous path, for `Renamed` events only.
    pub old_path: Option<PathBuf>,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Option<Self> {
        let path = path.into();
        let name = base_name(&path)?;
        Some(Self {
            path,
            name,
            kind,
            old_path: None,
        })
    }

    pub fn renamed(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Option<Self> {
        let path = new_path.into();
        let name = base_name(&path)?;
        Some(Self {
            path,
            name,
            kind: ChangeKind::Renamed,
            old_path: Some(old_path.into()),
        })
    }
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Flatten one `notify` event into zero or more [`RawEvent`]s.
///
/// Rename handling depends on what the platform backend reports:
/// - `RenameMode::Both` carries `[old, new]` in `paths`.
/// - `RenameMode::To` only knows the new path.
/// - `RenameMode::From` only knows the vanished path, which is treated as a
///   deletion.
///
/// Access events and catch-all kinds produce nothing.
pub fn normalize(event: &Event) -> Vec<RawEvent> {
    match &event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .filter_map(|p| RawEvent::new(p, ChangeKind::Created))
            .collect(),

        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::Both if event.paths.len() >= 2 => {
                RawEvent::renamed(&event.paths[0], &event.paths[1])
                    .into_iter()
                    .collect()
            }
            RenameMode::To => event
                .paths
                .iter()
                .filter_map(|p| RawEvent::new(p, ChangeKind::Renamed))
                .collect(),
            RenameMode::From => event
                .paths
                .iter()
                .filter_map(|p| RawEvent::new(p, ChangeKind::Deleted))
                .collect(),
            // `Any`/`Other` renames give no old/new distinction; treat the
            // reported paths as plain changes.
            _ => event
                .paths
                .iter()
                .filter_map(|p| RawEvent::new(p, ChangeKind::Changed))
                .collect(),
        },

        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter_map(|p| RawEvent::new(p, ChangeKind::Changed))
            .collect(),

        EventKind::Remove(_) => event
            .paths
            .iter()
            .filter_map(|p| RawEvent::new(p, ChangeKind::Deleted))
            .collect(),

        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

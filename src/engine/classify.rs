// src/engine/classify.rs

//! Fire-time classification of a debounced event.
//!
//! Classification deliberately happens when the entry fires, never when it is
//! enqueued: the filesystem may have changed between the first raw event of a
//! burst and the window elapsing, and the decision must reflect what the path
//! resolves to *now*.

use std::path::PathBuf;

use crate::watch::event::{ChangeKind, RawEvent};

/// The closed set of things the runtime can do with a fired event.
///
/// Adding a newly handled extension means adding a variant here and a match
/// arm in the runtime, not extending a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Copy a single file into the integration root (first-writer-wins).
    CopyFile { source: PathBuf },
    /// Mirror a whole directory tree into the integration root
    /// (last-writer-wins).
    MirrorDirectory { source: PathBuf },
    /// Convert a video file and publish the output.
    ConvertAndPublish { source: PathBuf },
    /// Do nothing, for the stated reason.
    Skip(SkipReason),
}

/// Why a fired event produced no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Path contains the configured exclusion marker.
    Excluded,
    /// Deletion handling is out of scope.
    Deletion,
    /// Entry no longer exists (removed between enqueue and expiry).
    Missing,
    /// File has no extension.
    NoExtension,
    /// Incremental `Changed` events never mirror directories or convert
    /// video; those are one-shot `Created`/`Renamed` affairs.
    ChangedNotEligible,
}

/// Decide what to do with a fired event.
///
/// Policy, in order:
/// 1. exclusion marker anywhere in the path (case-insensitive) suppresses
///    everything;
/// 2. deletions are ignored;
/// 3. a path that is currently a directory mirrors on `Created`/`Renamed`;
/// 4. a file with extension exactly `avi` converts on `Created`/`Renamed`;
/// 5. a file with any other extension copies, for any event kind;
/// 6. no extension, or a path that resolves to neither file nor directory,
///    does nothing.
///
/// For renames the *new* path is inspected and dispatched.
pub fn classify(event: &RawEvent, exclusion_marker: Option<&str>) -> Action {
    if let Some(marker) = exclusion_marker {
        if !marker.is_empty() && contains_ignore_case(&event.path.to_string_lossy(), marker) {
            return Action::Skip(SkipReason::Excluded);
        }
    }

    if event.kind == ChangeKind::Deleted {
        return Action::Skip(SkipReason::Deletion);
    }

    let path = &event.path;

    if path.is_dir() {
        return match event.kind {
            ChangeKind::Created | ChangeKind::Renamed => Action::MirrorDirectory {
                source: path.clone(),
            },
            _ => Action::Skip(SkipReason::ChangedNotEligible),
        };
    }

    if path.is_file() {
        // Extension match is byte-exact: `.AVI` is an ordinary copied file.
        return match path.extension().and_then(|e| e.to_str()) {
            None => Action::Skip(SkipReason::NoExtension),
            Some("avi") => match event.kind {
                ChangeKind::Created | ChangeKind::Renamed => Action::ConvertAndPublish {
                    source: path.clone(),
                },
                _ => Action::Skip(SkipReason::ChangedNotEligible),
            },
            Some(_) => Action::CopyFile {
                source: path.clone(),
            },
        };
    }

    // Entry vanished between enqueue and expiry; nothing to do, not an error.
    Action::Skip(SkipReason::Missing)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

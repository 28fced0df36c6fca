// src/engine/runtime.rs

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::action::convert::{schedule_conversion, ConvertContext, ConvertOutcome};
use crate::action::copy::{copy_file, CopyOutcome};
use crate::action::mirror::mirror_directory;
use crate::engine::classify::{classify, Action};
use crate::watch::event::{ChangeKind, RawEvent};

/// Events sent into the runtime from the debouncer, conversion tasks, or
/// external signals.
///
/// The idea is that:
/// - the debounce expiry loop sends `EntryExpired`
/// - conversion tasks send `ConversionFinished`
/// - Ctrl-C / `q` handling sends `ShutdownRequested`
#[derive(Debug)]
pub enum RuntimeEvent {
    EntryExpired(RawEvent),
    ConversionFinished {
        source: PathBuf,
        outcome: ConvertOutcome,
    },
    ShutdownRequested,
}

/// The main dispatch runtime.
///
/// Responsibilities:
/// - Consume fired events from the debouncer.
/// - Classify each fired event against the live filesystem.
/// - Run copy/mirror handlers inline; schedule conversions in the background.
/// - Contain every handler failure: an error is logged and the loop keeps
///   serving later events.
pub struct Runtime {
    integration_root: PathBuf,
    exclusion_marker: Option<String>,
    convert: ConvertContext,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<RuntimeEvent>,

    /// Handed to conversion tasks so they can report their terminal state.
    events_tx: mpsc::Sender<RuntimeEvent>,
}

impl Runtime {
    pub fn new(
        integration_root: PathBuf,
        exclusion_marker: Option<String>,
        convert: ConvertContext,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            integration_root,
            exclusion_marker,
            convert,
            events_rx,
            events_tx,
        }
    }

    /// Main event loop.
    ///
    /// Exits only on `ShutdownRequested` or when every sender is gone.
    /// In-flight conversions are abandoned at shutdown; there is no
    /// transactional guarantee for partial conversions.
    pub async fn run(mut self) -> Result<()> {
        info!("relaywatch runtime started");

        while let Some(event) = self.events_rx.recv().await {
            match event {
                RuntimeEvent::EntryExpired(fired) => self.handle_expired(fired),
                RuntimeEvent::ConversionFinished { source, outcome } => {
                    if outcome.is_failure() {
                        error!(source = %source.display(), "{outcome}");
                    } else {
                        info!(source = %source.display(), "{outcome}");
                    }
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    break;
                }
            }
        }

        info!("relaywatch runtime exiting");
        Ok(())
    }

    /// Handle one fired (debounced) event.
    ///
    /// This is the per-event failure boundary: nothing below may escape and
    /// stop the loop.
    fn handle_expired(&self, fired: RawEvent) {
        match (&fired.kind, &fired.old_path) {
            (ChangeKind::Renamed, Some(old)) => {
                info!(
                    old = %old.display(),
                    new = %fired.path.display(),
                    "entry renamed"
                );
            }
            _ => {
                info!(path = %fired.path.display(), kind = %fired.kind, "entry changed");
            }
        }

        match classify(&fired, self.exclusion_marker.as_deref()) {
            Action::Skip(reason) => {
                debug!(path = %fired.path.display(), ?reason, "no action");
            }

            Action::CopyFile { source } => {
                match copy_file(&source, &self.integration_root) {
                    Ok(CopyOutcome::Copied(dest)) => {
                        info!(dest = %dest.display(), "copied file to shared folder");
                    }
                    Ok(CopyOutcome::AlreadyPresent(dest)) => {
                        debug!(dest = %dest.display(), "shared copy already present");
                    }
                    Err(err) => {
                        error!(source = %source.display(), error = %err, "copy failed");
                    }
                }
            }

            Action::MirrorDirectory { source } => {
                match mirror_directory(&source, &self.integration_root) {
                    Ok(stats) => {
                        info!(
                            source = %source.display(),
                            files = stats.files_copied,
                            dirs = stats.dirs_created,
                            "mirrored directory to shared folder"
                        );
                    }
                    Err(err) => {
                        error!(source = %source.display(), error = %err, "mirror failed");
                    }
                }
            }

            Action::ConvertAndPublish { source } => {
                match schedule_conversion(&self.convert, source.clone(), self.events_tx.clone()) {
                    Ok(dest) => {
                        info!(
                            source = %source.display(),
                            dest = %dest.display(),
                            "conversion scheduled"
                        );
                    }
                    Err(err) => {
                        error!(source = %source.display(), error = %err, "scheduling conversion failed");
                    }
                }
            }
        }
    }
}

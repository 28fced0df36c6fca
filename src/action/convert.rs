// src/action/convert.rs

//! Convert-and-publish pipeline.
//!
//! Converting is the one handler that must not block the dispatch loop: the
//! transcode is scheduled as a fire-and-forget task on a semaphore-bounded
//! pool, and the add/commit continuation runs after it in the same blocking
//! task. The runtime only ever sees the terminal state, delivered back as a
//! [`RuntimeEvent::ConversionFinished`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

use crate::engine::RuntimeEvent;
use crate::media::{MediaConverter, MediaFormat};
use crate::vcs::VcsClient;

/// Terminal state of one conversion task.
///
/// All terminal states are observationally equivalent from the watcher's
/// perspective: logged and dropped, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The transcode itself failed.
    ConvertFailed,
    /// Output written; publishing disabled.
    Converted,
    /// Output written, but it could not be scheduled for addition.
    AddFailed,
    /// Added, but the commit failed.
    CommitFailed,
    /// Added and committed.
    Committed,
}

impl ConvertOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ConvertOutcome::ConvertFailed | ConvertOutcome::AddFailed | ConvertOutcome::CommitFailed
        )
    }
}

impl std::fmt::Display for ConvertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConvertOutcome::ConvertFailed => "conversion failed",
            ConvertOutcome::Converted => "converted (publishing disabled)",
            ConvertOutcome::AddFailed => "converted but not added",
            ConvertOutcome::CommitFailed => "added but not committed",
            ConvertOutcome::Committed => "converted and committed",
        };
        f.write_str(s)
    }
}

/// Everything a conversion task needs, shared by the runtime.
pub struct ConvertContext {
    pub publish_root: PathBuf,
    /// Used to check out the publish root if it is not yet a working copy.
    pub repo_url: Option<String>,
    pub converter: Arc<dyn MediaConverter>,
    /// `None` disables publishing; converted files are still written.
    pub vcs: Option<Arc<dyn VcsClient>>,
    /// Caps conversions in flight so a burst of video drops cannot exhaust
    /// the machine.
    pub permits: Arc<Semaphore>,
}

/// Output path for a converted file: `publish_root/<stem>.<format ext>`.
pub fn publish_target(source: &Path, publish_root: &Path, format: MediaFormat) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| anyhow!("source {:?} has no file stem", source))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(format.extension());
    Ok(publish_root.join(name))
}

/// Schedule a conversion of `source` and return the output path.
///
/// A stale output at the target path is deleted here, synchronously, before
/// the task is spawned — conversion is always latest-wins, and no consumer
/// may observe leftover content from a previous run. Everything after that
/// happens in the background; the terminal outcome is reported on
/// `runtime_tx`.
pub fn schedule_conversion(
    ctx: &ConvertContext,
    source: PathBuf,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<PathBuf> {
    let dest = publish_target(&source, &ctx.publish_root, MediaFormat::Mp4)?;

    fs::create_dir_all(&ctx.publish_root)
        .with_context(|| format!("creating publish root {:?}", ctx.publish_root))?;

    if dest.exists() {
        fs::remove_file(&dest)
            .with_context(|| format!("deleting stale output {:?}", dest))?;
    }

    let converter = Arc::clone(&ctx.converter);
    let vcs = ctx.vcs.clone();
    let publish_root = ctx.publish_root.clone();
    let repo_url = ctx.repo_url.clone();
    let permits = Arc::clone(&ctx.permits);
    let task_dest = dest.clone();

    tokio::spawn(async move {
        let _permit = match permits.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return, // semaphore closed, process shutting down
        };

        let blocking_source = source.clone();
        let outcome = match tokio::task::spawn_blocking(move || {
            run_pipeline(
                converter.as_ref(),
                vcs.as_deref(),
                &publish_root,
                repo_url.as_deref(),
                &blocking_source,
                &task_dest,
            )
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "conversion task panicked");
                ConvertOutcome::ConvertFailed
            }
        };

        let _ = runtime_tx
            .send(RuntimeEvent::ConversionFinished { source, outcome })
            .await;
    });

    Ok(dest)
}

/// Convert, then publish: add, then commit, each step independently fallible.
///
/// Commit is attempted only when add succeeds, and nothing is rolled back
/// on a later failure — publishing is best-effort, not a transaction.
fn run_pipeline(
    converter: &dyn MediaConverter,
    vcs: Option<&dyn VcsClient>,
    publish_root: &Path,
    repo_url: Option<&str>,
    source: &Path,
    dest: &Path,
) -> ConvertOutcome {
    info!(
        source = %source.display(),
        dest = %dest.display(),
        "converting media"
    );

    if let Err(err) = converter.convert_media(source, dest, MediaFormat::Mp4) {
        error!(source = %source.display(), error = %err, "media conversion failed");
        return ConvertOutcome::ConvertFailed;
    }

    let Some(vcs) = vcs else {
        return ConvertOutcome::Converted;
    };

    if !vcs.is_working_copy(publish_root) {
        match repo_url {
            Some(url) => {
                if let Err(err) = vcs.check_out(url, publish_root) {
                    error!(error = %err, "checkout failed; output left unpublished");
                    return ConvertOutcome::AddFailed;
                }
            }
            None => {
                warn!(
                    publish_root = %publish_root.display(),
                    "publish root is not a working copy and no repo_url is configured"
                );
                return ConvertOutcome::AddFailed;
            }
        }
    }

    match vcs.add(dest) {
        Ok(true) => {}
        Ok(false) => {
            warn!(dest = %dest.display(), "svn add had nothing to do");
            return ConvertOutcome::AddFailed;
        }
        Err(err) => {
            error!(error = %err, "svn add failed");
            return ConvertOutcome::AddFailed;
        }
    }

    match vcs.commit(dest) {
        // Ok(false) means no modification was detected; the output is still
        // in the repository's state, so the task is done.
        Ok(_) => ConvertOutcome::Committed,
        Err(err) => {
            error!(error = %err, "svn commit failed");
            ConvertOutcome::CommitFailed
        }
    }
}

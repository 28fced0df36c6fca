// src/media.rs

//! Media conversion seam.
//!
//! The watcher only needs "turn this file into that file in this container";
//! the codec work is delegated to an external engine. The trait keeps the
//! conversion pipeline testable without ffmpeg installed.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Target container for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Mp4,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
        }
    }
}

/// Transcodes one file to another.
///
/// Implementations are synchronous from the caller's perspective; the
/// conversion pipeline always invokes them from a blocking task, never from
/// the dispatch loop.
pub trait MediaConverter: Send + Sync {
    fn convert_media(&self, source: &Path, dest: &Path, format: MediaFormat) -> Result<()>;
}

/// Converter that shells out to the `ffmpeg` binary.
pub struct FfmpegConverter;

impl MediaConverter for FfmpegConverter {
    fn convert_media(&self, source: &Path, dest: &Path, _format: MediaFormat) -> Result<()> {
        // The container is inferred by ffmpeg from the destination extension,
        // which the pipeline derives from the requested format.
        let output = Command::new("ffmpeg")
            .arg("-nostdin")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(source)
            .arg("-y")
            .arg(dest)
            .output()
            .context("running ffmpeg. Is ffmpeg installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "ffmpeg failed on {:?} (exit {:?}): {}",
                source,
                output.status.code(),
                stderr.trim()
            );
        }

        Ok(())
    }
}

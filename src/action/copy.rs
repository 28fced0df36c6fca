// src/action/copy.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::errors::Result;

/// What happened to a single-file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// File was copied to this destination.
    Copied(PathBuf),
    /// Destination already existed; nothing was written.
    AlreadyPresent(PathBuf),
}

/// Copy `source` into the integration root.
///
/// The destination is `integration_root/<parent dir name>/<file name>`,
/// grouping shared files by the folder they came from. Missing destination
/// directories are created.
///
/// If the destination file already exists this is a no-op — an existing copy
/// is never overwritten, so a concurrent or repeated fire cannot clobber what
/// was shared first.
pub fn copy_file(source: &Path, integration_root: &Path) -> Result<CopyOutcome> {
    let file_name = source
        .file_name()
        .ok_or_else(|| anyhow!("source {:?} has no file name", source))?;
    let parent_name = source
        .parent()
        .and_then(|p| p.file_name())
        .ok_or_else(|| anyhow!("source {:?} has no parent directory name", source))?;

    let dest_dir = integration_root.join(parent_name);
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("creating shared directory {:?}", dest_dir))?;

    let dest = dest_dir.join(file_name);
    if dest.exists() {
        return Ok(CopyOutcome::AlreadyPresent(dest));
    }

    fs::copy(source, &dest)
        .with_context(|| format!("copying {:?} to {:?}", source, dest))?;

    Ok(CopyOutcome::Copied(dest))
}

// src/action/mirror.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::errors::Result;

/// Counters from one mirror run, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub files_copied: u64,
    pub dirs_created: u64,
}

/// Mirror the directory tree at `source` into
/// `integration_root/<source dir name>`.
///
/// Nested files **are overwritten** when already present at the destination:
/// a directory event represents a complete snapshot, so the mirror always
/// reflects the latest source state. This is the deliberate opposite of the
/// single-file copy rule.
///
/// Traversal is iterative with an explicit work stack, so arbitrarily deep
/// trees cannot overflow the call stack. Files in a directory are copied
/// before its subdirectories are descended into; sibling order is whatever
/// the OS returns.
pub fn mirror_directory(source: &Path, integration_root: &Path) -> Result<MirrorStats> {
    let dir_name = source
        .file_name()
        .ok_or_else(|| anyhow!("source {:?} has no directory name", source))?;
    let dest_root = integration_root.join(dir_name);

    let mut stats = MirrorStats::default();
    let mut stack: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), dest_root)];

    while let Some((src_dir, dst_dir)) = stack.pop() {
        fs::create_dir_all(&dst_dir)
            .with_context(|| format!("creating mirror directory {:?}", dst_dir))?;
        stats.dirs_created += 1;

        let mut subdirs = Vec::new();

        for entry in fs::read_dir(&src_dir)
            .with_context(|| format!("reading directory {:?}", src_dir))?
        {
            let entry = entry.with_context(|| format!("reading entry in {:?}", src_dir))?;
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());

            let file_type = entry
                .file_type()
                .with_context(|| format!("stat on {:?}", src))?;

            if file_type.is_dir() {
                subdirs.push((src, dst));
            } else if file_type.is_file() {
                // fs::copy truncates an existing destination.
                fs::copy(&src, &dst)
                    .with_context(|| format!("mirroring {:?} to {:?}", src, dst))?;
                stats.files_copied += 1;
            }
            // Symlinks and other entry kinds are skipped.
        }

        stack.extend(subdirs);
    }

    Ok(stats)
}

// src/vcs/mod.rs

//! Version-control seam.
//!
//! Publishing converted output means add + commit against a working copy.
//! The trait keeps the conversion pipeline testable without a repository,
//! and the [`svn`] module provides the real client on top of the `svn` CLI.

pub mod svn;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use svn::SvnCliClient;

/// A failed version-control operation.
///
/// Always carries the client's error code, the offending path, and the
/// root-cause message — failures are reported, never silently dropped.
#[derive(Debug, Clone, Error)]
#[error("vcs error {code} on {path:?}: {message}")]
pub struct VcsError {
    pub code: i32,
    pub path: PathBuf,
    pub message: String,
}

impl VcsError {
    pub fn new(code: i32, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Synchronous client against a version-control working copy.
///
/// All operations report success as `Ok(true)`; `Ok(false)` means the
/// operation ran but had nothing to do (e.g. a commit with no local
/// modification).
pub trait VcsClient: Send + Sync {
    /// Whether `path` is inside a checked-out working copy.
    fn is_working_copy(&self, path: &Path) -> bool;

    /// Check out `url` into `path`.
    fn check_out(&self, url: &str, path: &Path) -> Result<bool, VcsError>;

    /// Schedule `path` for addition, creating missing parents.
    fn add(&self, path: &Path) -> Result<bool, VcsError>;

    /// Commit `path`. Returns `Ok(false)` if no modification was detected.
    fn commit(&self, path: &Path) -> Result<bool, VcsError>;

    /// Schedule `path` for deletion.
    fn delete(&self, path: &Path) -> Result<bool, VcsError>;
}

// src/action/mod.rs

//! Action handlers.
//!
//! Each handler is an idempotent side-effecting function over a single fired
//! event plus read-only configuration; handlers keep no state between
//! invocations.
//!
//! - [`copy`] puts a single file into the integration root, first-writer-wins.
//! - [`mirror`] copies a whole directory tree, last-writer-wins.
//! - [`convert`] transcodes a video in the background and publishes the
//!   output to a version-controlled working copy.

pub mod convert;
pub mod copy;
pub mod mirror;

pub use convert::{schedule_conversion, ConvertContext, ConvertOutcome};
pub use copy::{copy_file, CopyOutcome};
pub use mirror::{mirror_directory, MirrorStats};

// src/errors.rs

//! Crate-wide error aliases.
//!
//! Most plumbing uses `anyhow`; the structured version-control error type
//! lives in [`crate::vcs`].

pub use anyhow::{Error, Result};

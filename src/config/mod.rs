// src/config/mod.rs

//! Configuration loading and validation for relaywatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like existing roots (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, PathsSection, SvnSection, WatchSection};
pub use validate::validate_config;

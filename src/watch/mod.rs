// src/watch/mod.rs

//! File watching and event debouncing.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Normalizing raw notifications into [`RawEvent`] values.
//! - Collapsing bursts of events for the same entry into a single fired
//!   event per debounce window.
//!
//! It does **not** inspect the filesystem to decide what to do with an
//! entry; classification happens at fire time in the engine.

pub mod debounce;
pub mod event;
pub mod watcher;

pub use debounce::Debouncer;
pub use event::{ChangeKind, RawEvent};
pub use watcher::{spawn_watcher, WatcherHandle};

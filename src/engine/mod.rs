// src/engine/mod.rs

//! Dispatch engine for relaywatch.
//!
//! This module ties together:
//! - the classifier that inspects a fired event's path at fire time and
//!   selects an action
//! - the main runtime event loop that reacts to:
//!   - expired debounce entries
//!   - conversion completion events
//!   - shutdown signals

pub mod classify;
pub mod runtime;

pub use classify::{classify, Action, SkipReason};
pub use runtime::{Runtime, RuntimeEvent};

// src/watch/debounce.rs

//! Burst coalescing for raw filesystem events.
//!
//! Notification backends fire several events for one logical change (a single
//! file write raises multiple "changed" events; a copy raises "created" plus
//! a run of "changed"). The [`Debouncer`] keeps at most one pending entry per
//! entry name: the first event of a burst is retained, every later event for
//! the same name inside the window is swallowed, and the retained event is
//! fired once when the window elapses.
//!
//! The window is deliberately **not** extended by later events, and the fired
//! event is the first of the burst, not the latest. Changing either would
//! change which path/kind is acted on downstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::engine::RuntimeEvent;
use crate::watch::event::RawEvent;

struct PendingEntry {
    event: RawEvent,
    expires_at: Instant,
}

struct DebounceTable {
    window: Duration,
    pending: Mutex<HashMap<String, PendingEntry>>,
}

/// Coalesces raw events keyed by entry name and fires each retained event
/// exactly once after its window elapses.
///
/// Cloning is cheap; all clones share one pending table.
#[derive(Clone)]
pub struct Debouncer {
    inner: Arc<DebounceTable>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(DebounceTable {
                window,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a candidate event.
    ///
    /// If no pending entry exists for `event.name`, the event is retained
    /// with a deadline of `now + window` and will fire later. If an entry
    /// already exists, the new event is silently discarded; the existing
    /// deadline is left untouched.
    ///
    /// Safe to call concurrently from watcher threads. Never blocks on I/O;
    /// this is purely a table insert-if-absent.
    pub fn notify(&self, event: RawEvent) {
        let mut pending = self.inner.pending.lock().expect("pending table poisoned");
        match pending.entry(event.name.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => {
                trace!(name = %event.name, kind = %event.kind, "swallowed duplicate event");
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                trace!(name = %event.name, kind = %event.kind, "retained first event of burst");
                slot.insert(PendingEntry {
                    event,
                    expires_at: Instant::now() + self.inner.window,
                });
            }
        }
    }

    /// Remove and return every retained event whose deadline has passed.
    ///
    /// Exposed separately from the expiry loop so the coalescing policy can
    /// be exercised with a caller-supplied clock.
    pub fn drain_expired(&self, now: Instant) -> Vec<RawEvent> {
        let mut pending = self.inner.pending.lock().expect("pending table poisoned");
        let expired: Vec<String> = pending
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|key| pending.remove(&key))
            .map(|entry| entry.event)
            .collect()
    }

    /// Number of entries currently awaiting expiry.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().expect("pending table poisoned").len()
    }

    /// Spawn the single background task that drives expirations.
    ///
    /// Each fired event is pushed as [`RuntimeEvent::EntryExpired`] onto the
    /// runtime channel; the loop ends only when the receiving side is gone.
    /// Handler failures happen on the consuming side and cannot stop this
    /// loop.
    pub fn spawn_expiry_loop(&self, runtime_tx: mpsc::Sender<RuntimeEvent>) -> JoinHandle<()> {
        let debouncer = self.clone();
        let tick = tick_interval(self.inner.window);

        tokio::spawn(async move {
            debug!(tick_ms = tick.as_millis() as u64, "debounce expiry loop started");
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                for event in debouncer.drain_expired(Instant::now()) {
                    if let Err(err) = runtime_tx
                        .send(RuntimeEvent::EntryExpired(event))
                        .await
                    {
                        warn!("runtime channel closed, stopping expiry loop: {err}");
                        return;
                    }
                }
            }
        })
    }
}

/// Poll the table at a fraction of the window so firing lag stays small
/// relative to the debounce duration.
fn tick_interval(window: Duration) -> Duration {
    let quarter = window / 4;
    quarter.clamp(Duration::from_millis(5), Duration::from_millis(50))
}

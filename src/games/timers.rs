//! Scoped, cancellable delayed callbacks.
//!
//! Each pending timer is bound to a key. Scheduling a key that is already
//! pending replaces its deadline, so two timers for the same target never
//! race. The queue does not run anything itself: the owner asks for the keys
//! that are due and applies them.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

use tracing::{debug, instrument};

/// Target of a delayed callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Turn a mismatched Memory pair face down again.
    Unflip {
        /// Card flipped first.
        first: usize,
        /// Card flipped second.
        second: usize,
    },
    /// Clear an incorrect Fill row back to idle.
    ResetRow(usize),
    /// Stop shaking a Match chip.
    Shake(String),
}

/// Pending delayed callbacks keyed by target.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    pending: HashMap<K, Instant>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> TimerQueue<K> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `key` to fire at `deadline`, superseding any pending timer
    /// for the same key. Returns `true` if one was superseded.
    #[instrument(skip(self))]
    pub fn schedule(&mut self, key: K, deadline: Instant) -> bool {
        let superseded = self.pending.insert(key, deadline).is_some();
        if superseded {
            debug!("Superseded pending timer");
        }
        superseded
    }

    /// Cancels the timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "Cancelling all pending timers");
        }
        self.pending.clear();
    }

    /// Whether a timer for `key` is pending.
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns every key due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (key.clone(), *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }
}

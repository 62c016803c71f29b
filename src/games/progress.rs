//! Attempt/success counters and the Ready → Playing → Won phase.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Lifecycle phase of one play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Layout built, no input accepted yet.
    Ready,
    /// At least one action has been accepted.
    Playing,
    /// All pairs resolved. Terminal.
    Won,
}

/// Counters shown to the player.
///
/// Both counters only ever increase. `successes` reaches `pair_count`
/// exactly once, and that is the only way into [`Phase::Won`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameProgress {
    /// Resolved player actions (variant-specific).
    attempts: usize,
    /// Cards, rows, or pairs resolved correctly.
    successes: usize,
    /// Number of pairs to resolve (N).
    pair_count: usize,
    /// Current phase.
    phase: Phase,
}

impl GameProgress {
    /// Fresh counters for a lesson with `pair_count` pairs.
    pub fn new(pair_count: usize) -> Self {
        Self {
            attempts: 0,
            successes: 0,
            pair_count,
            phase: Phase::Ready,
        }
    }

    /// Whether the session has been won.
    pub fn is_won(&self) -> bool {
        self.phase == Phase::Won
    }

    /// Pairs still to resolve.
    pub fn remaining(&self) -> usize {
        self.pair_count - self.successes
    }

    /// Marks the first accepted action.
    pub(crate) fn begin(&mut self) {
        if self.phase == Phase::Ready {
            debug!("First action accepted, game is playing");
            self.phase = Phase::Playing;
        }
    }

    /// Counts one resolved attempt.
    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
        debug!(attempts = self.attempts, "Attempt recorded");
    }

    /// Counts one success; returns `true` only on the transition into
    /// [`Phase::Won`].
    pub(crate) fn record_success(&mut self) -> bool {
        if self.is_won() {
            return false;
        }
        self.successes += 1;
        debug!(successes = self.successes, pair_count = self.pair_count, "Success recorded");
        if self.successes == self.pair_count {
            info!(attempts = self.attempts, "All pairs resolved");
            self.phase = Phase::Won;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_won_only_at_pair_count() {
        let mut progress = GameProgress::new(2);
        progress.begin();
        assert_eq!(*progress.phase(), Phase::Playing);
        assert!(!progress.record_success());
        assert_eq!(progress.remaining(), 1);
        assert!(progress.record_success());
        assert!(progress.is_won());
    }

    #[test]
    fn test_success_after_win_is_ignored() {
        let mut progress = GameProgress::new(1);
        assert!(progress.record_success());
        assert!(!progress.record_success());
        assert_eq!(*progress.successes(), 1);
    }
}

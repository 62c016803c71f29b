//! The shape every mini-game shares.
//!
//! A variant owns its layout and applies its own actions; the counters,
//! timers, and clock it needs are lent to it per action through a
//! [`TurnContext`]. The engine does the rest (win detection, reporting).

use std::fmt::Debug;
use std::time::Instant;

use derive_more::{Display, Error};
use rand::Rng;

use super::action::{ActionError, ActionOutcome};
use super::progress::GameProgress;
use super::timers::{TimerKey, TimerQueue};
use crate::config::Timings;
use crate::lesson::{GameKind, Lesson};

/// A lesson cannot be laid out for the chosen game.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LayoutError {
    /// Fill needs at least one character per translation.
    #[display("Translation in row {} is empty, nothing to fill in", row)]
    EmptyTranslation {
        /// Offending row.
        row: usize,
    },
}

/// Mutable session state lent to a variant for one action or timer.
#[derive(Debug)]
pub struct TurnContext<'a> {
    /// Counters and phase.
    pub progress: &'a mut GameProgress,
    /// Pending delayed callbacks.
    pub timers: &'a mut TimerQueue<TimerKey>,
    /// Feedback delays.
    pub timings: &'a Timings,
    /// Current time.
    pub now: Instant,
}

/// A mini-game strategy: build a layout, apply actions, know when it is won.
pub trait GameVariant: Sized + Debug {
    /// The action this game accepts.
    type Action: Debug;

    /// Which game this is.
    const KIND: GameKind;

    /// Builds a fresh randomized layout for `lesson`.
    fn build_layout<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Result<Self, LayoutError>;

    /// Applies one player action.
    fn apply_action(
        &mut self,
        action: Self::Action,
        turn: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, ActionError>;

    /// Runs a delayed callback that has come due.
    fn on_timer(&mut self, key: &TimerKey);

    /// Whether every pair is resolved on the board itself.
    fn is_won(&self) -> bool;
}

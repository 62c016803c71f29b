//! One play session's game state: layout, counters, timers, and the single
//! transition into Won.
//!
//! The engine is synchronous and clock-agnostic. Callers pass the current
//! [`Instant`] with every action and call [`GameEngine::tick`] when
//! [`GameEngine::next_deadline`] passes; nothing here sleeps or spawns.

use std::time::Instant;

use derive_getters::Getters;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::config::Timings;
use crate::games::{
    ActionError, ActionOutcome, AnyGame, GameProgress, LayoutError, PlayerAction, TimerKey,
    TimerQueue, TurnContext,
};
use crate::lesson::{GameKind, Lesson, PlayerProfile};

/// Game state for one lesson session.
#[derive(Debug, Clone, Getters)]
pub struct GameEngine {
    /// Lesson snapshot being played.
    lesson: Lesson,
    /// Player profile, if it could be loaded.
    profile: Option<PlayerProfile>,
    /// Current layout.
    game: AnyGame,
    /// Counters and phase.
    progress: GameProgress,
    /// Feedback delays.
    timings: Timings,
    #[getter(skip)]
    timers: TimerQueue<TimerKey>,
    #[getter(skip)]
    abandoned: bool,
}

impl GameEngine {
    /// Lays out `lesson` and creates fresh counters.
    ///
    /// The game kind defaults to the lesson's own tag.
    #[instrument(skip(lesson, profile, rng), fields(lesson_id = %lesson.id()))]
    pub fn new<R: Rng + ?Sized>(
        lesson: Lesson,
        profile: Option<PlayerProfile>,
        kind: Option<GameKind>,
        timings: Timings,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        let kind = kind.unwrap_or(*lesson.kind());
        let game = AnyGame::build(kind, &lesson, rng)?;
        let progress = GameProgress::new(lesson.pair_count());
        info!(%kind, pairs = lesson.pair_count(), has_profile = profile.is_some(), "Game ready");
        Ok(Self {
            lesson,
            profile,
            game,
            progress,
            timings,
            timers: TimerQueue::new(),
            abandoned: false,
        })
    }

    /// Which game is being played.
    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    /// Whether the session has been won.
    pub fn is_won(&self) -> bool {
        self.progress.is_won()
    }

    /// Whether the session has been abandoned.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Applies a player action at `now`.
    ///
    /// Timers due at `now` fire first. Returns [`ActionOutcome::Won`] exactly
    /// once, on the action that resolves the last pair; after that every
    /// action is rejected with [`ActionError::GameOver`].
    #[instrument(skip(self, now), fields(kind = %self.game.kind()))]
    pub fn handle(
        &mut self,
        action: PlayerAction,
        now: Instant,
    ) -> Result<ActionOutcome, ActionError> {
        if self.abandoned {
            return Err(ActionError::Abandoned);
        }
        self.tick(now);
        if self.progress.is_won() {
            debug!("Action after win rejected");
            return Err(ActionError::GameOver);
        }

        let attempts_before = *self.progress.attempts();
        let successes_before = *self.progress.successes();

        let mut turn = TurnContext {
            progress: &mut self.progress,
            timers: &mut self.timers,
            timings: &self.timings,
            now,
        };
        let outcome = self.game.apply_action(action, &mut turn)?;

        debug_assert!(*self.progress.attempts() >= attempts_before);
        debug_assert!(*self.progress.successes() >= successes_before);
        debug_assert_eq!(self.progress.is_won(), self.game.is_won());

        if self.progress.is_won() {
            info!(
                attempts = *self.progress.attempts(),
                pairs = *self.progress.pair_count(),
                "Lesson won"
            );
            return Ok(ActionOutcome::Won);
        }
        Ok(outcome)
    }

    /// Fires every timer due at `now`. Returns how many fired.
    #[instrument(skip(self, now))]
    pub fn tick(&mut self, now: Instant) -> usize {
        if self.abandoned {
            return 0;
        }
        let due = self.timers.pop_due(now);
        for key in &due {
            debug!(?key, "Timer fired");
            self.game.on_timer(key);
        }
        due.len()
    }

    /// Ends the session: cancels every pending timer and rejects further
    /// input.
    #[instrument(skip(self))]
    pub fn abandon(&mut self) {
        if !self.abandoned {
            info!(pending_timers = self.timers.len(), "Abandoning game session");
        }
        self.timers.clear();
        self.abandoned = true;
    }

    /// Lays the same lesson out again with fresh counters, discarding the
    /// previous board, timers, and Won state.
    #[instrument(skip(self, rng))]
    pub fn replay<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), LayoutError> {
        if self.abandoned {
            warn!("Replay of an abandoned session ignored");
            return Ok(());
        }
        let kind = self.game.kind();
        self.game = AnyGame::build(kind, &self.lesson, rng)?;
        self.progress = GameProgress::new(self.lesson.pair_count());
        self.timers.clear();
        info!(%kind, "Replaying lesson");
        Ok(())
    }
}

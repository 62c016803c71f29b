//! A running lesson session: gate, loader, engine, and win report.

use std::time::Instant;

use derive_more::{Display, Error, From};
use derive_new::new;
use rand::Rng;
use tracing::{error, info, instrument, warn};

use super::{AbandonSignal, LessonLoader, LoadError, SessionContext, SessionGate, Verification};
use crate::api::{ApiError, SharedService};
use crate::config::Timings;
use crate::engine::GameEngine;
use crate::games::{ActionError, ActionOutcome, LayoutError, PlayerAction};
use crate::lesson::GameKind;
use crate::stats::{ReportHandle, StatsReporter};

/// A failure that ends the session before a board is shown.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// The lesson could not be fetched.
    #[display("Could not load lesson: {}", _0)]
    LessonFetch(ApiError),
    /// The fetched lesson cannot be played as the requested game.
    #[display("Could not lay out lesson: {}", _0)]
    Layout(LayoutError),
}

/// Per-session settings supplied by the caller.
#[derive(Debug, Clone, Copy, Default, new)]
pub struct SessionOptions {
    /// Feedback delays.
    timings: Timings,
    /// Game to play instead of the lesson's own tag.
    kind: Option<GameKind>,
}

/// How session entry ended.
#[derive(Debug)]
pub enum SessionStart {
    /// The board is ready.
    Ready(Box<PlaySession>),
    /// The credential was missing or invalid and has been discarded.
    LoginRequired,
    /// No lesson was chosen.
    LessonSelectionRequired,
    /// The session was abandoned while entry was in flight; any late
    /// results were discarded.
    Abandoned,
}

/// One lesson being played.
#[derive(Debug)]
pub struct PlaySession {
    engine: GameEngine,
    reporter: StatsReporter,
    report: Option<ReportHandle>,
}

impl PlaySession {
    /// Enters a session: verifies the credential, loads the lesson and
    /// profile, and lays out the board.
    ///
    /// Remote calls race `abandon`; once it fires their results are dropped
    /// and [`SessionStart::Abandoned`] is returned.
    #[instrument(skip_all, fields(lesson_id = ?ctx.lesson_id()))]
    pub async fn start<R: Rng + ?Sized>(
        service: SharedService,
        ctx: &mut SessionContext,
        options: SessionOptions,
        rng: &mut R,
        abandon: &mut AbandonSignal,
    ) -> Result<SessionStart, SessionError> {
        if abandon.is_abandoned() {
            return Ok(SessionStart::Abandoned);
        }

        let gate = SessionGate::new(service.clone());
        let verification = tokio::select! {
            biased;
            _ = abandon.abandoned() => return Ok(SessionStart::Abandoned),
            verification = gate.verify(ctx) => verification,
        };
        let Verification::Valid(credential) = verification else {
            return Ok(SessionStart::LoginRequired);
        };

        let loader = LessonLoader::new(service.clone());
        let loaded = tokio::select! {
            biased;
            _ = abandon.abandoned() => return Ok(SessionStart::Abandoned),
            loaded = loader.load(&credential, ctx.lesson_id().as_ref(), ctx.username().as_deref()) => loaded,
        };
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(LoadError::NoLessonSelected) => return Ok(SessionStart::LessonSelectionRequired),
            Err(LoadError::Fetch(e)) => return Err(SessionError::LessonFetch(e)),
        };

        let (lesson, profile) = loaded.into_parts();
        let engine = GameEngine::new(lesson, profile, options.kind, options.timings, rng)
            .inspect_err(|e| error!(error = %e, "Lesson cannot be laid out"))?;
        info!(kind = %engine.kind(), "Session ready");

        Ok(SessionStart::Ready(Box::new(Self {
            engine,
            reporter: StatsReporter::new(service, credential),
            report: None,
        })))
    }

    /// The engine, for rendering.
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Applies a player action. The action that wins the game also
    /// dispatches the win report on the runtime that started the session,
    /// so this may be called from a plain thread.
    #[instrument(skip(self, now))]
    pub fn handle(
        &mut self,
        action: PlayerAction,
        now: Instant,
    ) -> Result<ActionOutcome, ActionError> {
        let outcome = self.engine.handle(action, now)?;
        if outcome == ActionOutcome::Won {
            let handle = self
                .reporter
                .report_win(self.engine.lesson(), self.engine.profile().as_ref());
            if self.report.replace(handle).is_some() {
                warn!("Previous win report was never collected");
            }
        }
        Ok(outcome)
    }

    /// Fires due timers.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.engine.tick(now)
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    /// Plays the same lesson again on a fresh board.
    pub fn replay<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), LayoutError> {
        self.engine.replay(rng)
    }

    /// Ends the session. Pending timers are cancelled; an already dispatched
    /// win report still runs.
    pub fn abandon(&mut self) {
        self.engine.abandon();
    }

    /// Takes the handle of the last dispatched win report.
    pub fn take_report(&mut self) -> Option<ReportHandle> {
        self.report.take()
    }
}

//! Strictly Lessons library - vocabulary mini-games over a lesson service
//!
//! A lesson (one language, aligned words and translations) is played as one
//! of three mini-games: Memory, Fill, or Match.
//!
//! # Architecture
//!
//! - **Session**: credential gate and lesson loader at session entry
//! - **Engine**: per-session layout, counters, timers, single Won transition
//! - **Games**: the three variants behind one [`GameVariant`] strategy trait
//! - **Stats**: best-effort win reporting in background tasks
//! - **Api**: the remote lesson service contract and its REST transport
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_lessons::{
//!     abandon_pair, ClientConfig, Credential, LessonId, PlaySession, RestLessonService,
//!     SessionContext, SessionOptions, SessionStart,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let service = Arc::new(RestLessonService::from_config(&config)?);
//! let mut ctx = SessionContext::new(
//!     Credential::parse("token"),
//!     LessonId::parse("lesson-id"),
//!     Some("ana".to_string()),
//! );
//! let (_handle, mut signal) = abandon_pair();
//! let mut rng = rand::rng();
//! let options = SessionOptions::new(*config.timings(), None);
//! if let SessionStart::Ready(session) =
//!     PlaySession::start(service, &mut ctx, options, &mut rng, &mut signal).await?
//! {
//!     println!("{} pairs", session.engine().lesson().pair_count());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod engine;
mod games;
mod lesson;
mod session;
mod stats;

// Crate-level exports - Lesson snapshot types
pub use lesson::{Credential, GameKind, Lesson, LessonError, LessonId, PlayerProfile};

// Crate-level exports - Remote service
pub use api::{
    ApiError, ErrorBody, LessonRecord, LessonService, LessonSummary, PlayCountUpdate,
    ProfileRecord, ProfileUpdate, RestLessonService, SharedService, VerifyRequest, VerifyResponse,
};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, DEFAULT_CONFIG_FILE, Timings};

// Crate-level exports - Games
pub use games::{
    ActionError, ActionOutcome, AnyGame, Card, DropChip, EnterChar, FillRow, FillSheet, FlipCard,
    GameProgress, GameVariant, LayoutError, MatchBoard, MatchRow, MemoryBoard, Phase,
    PlayerAction, RowStatus, TimerKey, TimerQueue, TurnContext,
};

// Crate-level exports - Engine
pub use engine::GameEngine;

// Crate-level exports - Session entry
pub use session::{
    AbandonHandle, AbandonSignal, LessonLoader, LoadError, LoadedLesson, PlaySession,
    SessionContext, SessionError, SessionGate, SessionOptions, SessionStart, Verification,
    abandon_pair,
};

// Crate-level exports - Win reporting
pub use stats::{BestEffort, ReportHandle, StatsReporter, win_effects};

//! Best-effort win reporting.
//!
//! A win produces up to two remote updates. They run as detached tokio tasks:
//! the caller never awaits them before showing the win, and a failure is
//! logged and dropped.

use derive_new::new;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{ProfileUpdate, SharedService};
use crate::lesson::{Credential, Lesson, LessonId, PlayerProfile};

/// A remote update whose failure must not affect the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    /// Store the lesson's incremented play counter.
    IncrementLessonPlays {
        /// Lesson that was won.
        lesson_id: LessonId,
        /// Counter value after this win.
        new_count: u32,
    },
    /// Store the player's learned languages and score.
    UpdateProfile {
        /// Player to update.
        username: String,
        /// Full replacement record.
        update: ProfileUpdate,
    },
}

/// Effects one win of `lesson` should produce.
///
/// The lesson counter is always bumped; the profile update is only emitted
/// when a profile was loaded.
pub fn win_effects(lesson: &Lesson, profile: Option<&PlayerProfile>) -> Vec<BestEffort> {
    let mut effects = vec![BestEffort::IncrementLessonPlays {
        lesson_id: lesson.id().clone(),
        new_count: lesson.play_count().saturating_add(1),
    }];
    if let Some(profile) = profile {
        let updated = profile.after_win(lesson.language());
        effects.push(BestEffort::UpdateProfile {
            username: updated.username().clone(),
            update: ProfileUpdate::from(&updated),
        });
    }
    effects
}

/// Dispatches win effects against the lesson service.
///
/// Built inside a tokio runtime and remembers it, so wins can be reported
/// from threads that are not running the runtime.
#[derive(Clone, new)]
pub struct StatsReporter {
    service: SharedService,
    credential: Credential,
    #[new(value = "Handle::current()")]
    runtime: Handle,
}

impl std::fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsReporter")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl StatsReporter {
    /// Spawns the effects of one win on the reporter's runtime and returns
    /// immediately.
    #[instrument(skip_all, fields(lesson_id = %lesson.id(), has_profile = profile.is_some()))]
    pub fn report_win(&self, lesson: &Lesson, profile: Option<&PlayerProfile>) -> ReportHandle {
        let effects = win_effects(lesson, profile);
        info!(count = effects.len(), "Dispatching win report");
        let tasks = effects
            .into_iter()
            .map(|effect| {
                let service = self.service.clone();
                let credential = self.credential.clone();
                self.runtime
                    .spawn(async move { Self::apply(service, credential, effect).await })
            })
            .collect();
        ReportHandle { tasks }
    }

    /// Runs one effect; returns whether it succeeded.
    async fn apply(service: SharedService, credential: Credential, effect: BestEffort) -> bool {
        let result = match &effect {
            BestEffort::IncrementLessonPlays {
                lesson_id,
                new_count,
            } => {
                service
                    .increment_lesson_plays(&credential, lesson_id, *new_count)
                    .await
            }
            BestEffort::UpdateProfile { username, update } => {
                service.update_profile(&credential, username, update).await
            }
        };
        match result {
            Ok(()) => {
                debug!(?effect, "Win report applied");
                true
            }
            Err(e) => {
                warn!(?effect, error = %e, "Win report failed; discarding");
                false
            }
        }
    }
}

/// Handles to the background report tasks.
///
/// Dropping it detaches the tasks; they still run to completion.
#[derive(Debug, Default)]
pub struct ReportHandle {
    tasks: Vec<JoinHandle<bool>>,
}

impl ReportHandle {
    /// Number of effects dispatched.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing was dispatched.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every task and returns how many succeeded.
    pub async fn settled(self) -> usize {
        let mut succeeded = 0;
        for task in self.tasks {
            match task.await {
                Ok(true) => succeeded += 1,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Win report task did not finish"),
            }
        }
        succeeded
    }
}

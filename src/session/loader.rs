//! Lesson and profile fetch at session entry.

use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiError, SharedService};
use crate::lesson::{Credential, Lesson, LessonId, PlayerProfile};

/// Lesson loading did not produce a lesson.
#[derive(Debug, Clone, Display, Error)]
pub enum LoadError {
    /// No lesson was chosen. Not a failure: the caller goes back to lesson
    /// selection.
    #[display("No lesson selected")]
    NoLessonSelected,
    /// The lesson could not be fetched.
    #[display("Lesson fetch failed: {}", _0)]
    Fetch(ApiError),
}

/// A fetched lesson plus the player's profile when it was available.
#[derive(Debug, Clone, Getters)]
pub struct LoadedLesson {
    lesson: Lesson,
    profile: Option<PlayerProfile>,
}

impl LoadedLesson {
    /// Splits into the lesson and the optional profile.
    pub fn into_parts(self) -> (Lesson, Option<PlayerProfile>) {
        (self.lesson, self.profile)
    }
}

/// Fetches the lesson snapshot and, best-effort, the player profile.
#[derive(Clone)]
pub struct LessonLoader {
    service: SharedService,
}

impl std::fmt::Debug for LessonLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonLoader").finish_non_exhaustive()
    }
}

impl LessonLoader {
    /// Creates a loader backed by `service`.
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }

    /// Loads `lesson_id` and, if `username` is given, that player's profile.
    ///
    /// Both requests run concurrently. A profile failure only leaves the
    /// profile absent; a lesson failure is returned.
    #[instrument(skip(self, credential))]
    pub async fn load(
        &self,
        credential: &Credential,
        lesson_id: Option<&LessonId>,
        username: Option<&str>,
    ) -> Result<LoadedLesson, LoadError> {
        let Some(id) = lesson_id else {
            info!("No lesson chosen");
            return Err(LoadError::NoLessonSelected);
        };

        let profile = async {
            let username = username?;
            match self.service.get_profile(credential, username).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "Profile unavailable; player stats will be skipped");
                    None
                }
            }
        };
        let (lesson, profile) = tokio::join!(self.service.get_lesson(credential, id), profile);

        let lesson = lesson.map_err(|e| {
            error!(error = %e, "Lesson fetch failed");
            LoadError::Fetch(e)
        })?;
        debug!(has_profile = profile.is_some(), "Lesson loaded");
        Ok(LoadedLesson { lesson, profile })
    }
}

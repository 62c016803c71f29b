//! Session entry: credential check, lesson load, and the play session that
//! ties the engine to win reporting.
//!
//! Nothing here reads ambient state. The caller builds a [`SessionContext`]
//! from whatever storage it has and passes it in explicitly.

mod gate;
mod loader;
mod play;

use derive_getters::Getters;
use derive_new::new;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::lesson::{Credential, LessonId};

pub use gate::{SessionGate, Verification};
pub use loader::{LessonLoader, LoadError, LoadedLesson};
pub use play::{PlaySession, SessionError, SessionOptions, SessionStart};

/// What the caller knows at session entry.
///
/// The credential is discarded as soon as it is found invalid and is never
/// reused afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, new)]
pub struct SessionContext {
    /// Bearer credential, if the player is logged in.
    credential: Option<Credential>,
    /// Lesson the player chose.
    lesson_id: Option<LessonId>,
    /// Player whose profile should be loaded and updated.
    username: Option<String>,
}

impl SessionContext {
    /// Forgets the credential.
    #[instrument(skip(self))]
    pub fn discard_credential(&mut self) {
        if self.credential.take().is_some() {
            info!("Credential discarded");
        }
    }

    /// Leaves the current lesson: the chosen lesson id is cleared so the
    /// next entry starts from lesson selection.
    #[instrument(skip(self))]
    pub fn back_out(&mut self) {
        if let Some(id) = self.lesson_id.take() {
            debug!(lesson_id = %id, "Cleared chosen lesson");
        }
    }
}

/// Creates a connected abandon handle and signal.
pub fn abandon_pair() -> (AbandonHandle, AbandonSignal) {
    let (tx, rx) = watch::channel(false);
    (AbandonHandle { tx }, AbandonSignal { rx })
}

/// Raises the abandon flag for a session being navigated away from.
#[derive(Debug, Clone)]
pub struct AbandonHandle {
    tx: watch::Sender<bool>,
}

impl AbandonHandle {
    /// Marks the session abandoned. Idempotent.
    pub fn abandon(&self) {
        if !self.tx.send_replace(true) {
            info!("Session abandoned");
        }
    }
}

/// Observes the abandon flag.
#[derive(Debug, Clone)]
pub struct AbandonSignal {
    rx: watch::Receiver<bool>,
}

impl AbandonSignal {
    /// Whether the session has been abandoned.
    pub fn is_abandoned(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the session is abandoned.
    ///
    /// Never resolves if every handle is dropped without abandoning.
    pub async fn abandoned(&mut self) {
        if self.rx.wait_for(|flag| *flag).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

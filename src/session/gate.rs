//! Credential verification at session entry.

use tracing::{info, instrument, warn};

use super::SessionContext;
use crate::api::SharedService;
use crate::lesson::Credential;

/// Result of checking the held credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The service accepted the credential.
    Valid(Credential),
    /// Missing, rejected, or unverifiable. The player must log in again.
    Invalid,
}

/// Checks the session credential once per session entry.
#[derive(Clone)]
pub struct SessionGate {
    service: SharedService,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate").finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Creates a gate backed by `service`.
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }

    /// Verifies the credential held in `ctx`.
    ///
    /// Fails closed: a transport error, an error status, and an explicit
    /// rejection all yield [`Verification::Invalid`], and the credential is
    /// removed from `ctx`. There is a single attempt, no retry.
    #[instrument(skip_all)]
    pub async fn verify(&self, ctx: &mut SessionContext) -> Verification {
        let Some(credential) = ctx.credential().clone() else {
            info!("No credential held; login required");
            return Verification::Invalid;
        };

        match self.service.verify_credential(&credential).await {
            Ok(true) => {
                info!("Credential verified");
                Verification::Valid(credential)
            }
            Ok(false) => {
                warn!("Credential rejected by the service");
                ctx.discard_credential();
                Verification::Invalid
            }
            Err(e) => {
                warn!(error = %e, "Credential could not be verified; treating as invalid");
                ctx.discard_credential();
                Verification::Invalid
            }
        }
    }
}

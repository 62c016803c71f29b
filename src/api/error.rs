//! Lesson service error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Failure talking to the lesson service, with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("API error: {} at {}:{}", message, file, line)]
pub struct ApiError {
    /// Error message.
    pub message: String,
    /// HTTP status, when the service answered at all.
    pub status: Option<u16>,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ApiError {
    /// Creates a new API error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            status: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates an error for a non-success HTTP status.
    #[track_caller]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(message);
        err.status = Some(status);
        err
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let mut api_err = Self::new(format!("HTTP error: {}", err));
        api_err.status = err.status().map(|s| s.as_u16());
        api_err
    }
}

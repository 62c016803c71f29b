//! Remote lesson service: contract, REST transport, and wire records.

mod client;
mod error;
mod models;

pub use client::{LessonService, RestLessonService, SharedService};
pub use error::ApiError;
pub use models::{
    ErrorBody, LessonRecord, LessonSummary, PlayCountUpdate, ProfileRecord, ProfileUpdate,
    VerifyRequest, VerifyResponse,
};

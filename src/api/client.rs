//! Lesson service contract and its REST implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use super::error::ApiError;
use super::models::{
    ErrorBody, LessonRecord, LessonSummary, PlayCountUpdate, ProfileRecord, ProfileUpdate,
    VerifyRequest, VerifyResponse,
};
use crate::config::ClientConfig;
use crate::lesson::{Credential, Lesson, LessonId, PlayerProfile};

/// Remote operations the game engine consumes.
///
/// Verification and loading are awaited by the session; the two update calls
/// are only ever issued as best-effort background work.
#[async_trait]
pub trait LessonService: Send + Sync {
    /// Asks whether `credential` is currently valid.
    async fn verify_credential(&self, credential: &Credential) -> Result<bool, ApiError>;

    /// Fetches one lesson.
    async fn get_lesson(&self, credential: &Credential, id: &LessonId)
    -> Result<Lesson, ApiError>;

    /// Fetches a player's profile.
    async fn get_profile(
        &self,
        credential: &Credential,
        username: &str,
    ) -> Result<PlayerProfile, ApiError>;

    /// Stores a new play counter for a lesson.
    async fn increment_lesson_plays(
        &self,
        credential: &Credential,
        id: &LessonId,
        new_count: u32,
    ) -> Result<(), ApiError>;

    /// Replaces a player's learned languages and score.
    async fn update_profile(
        &self,
        credential: &Credential,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError>;

    /// Lists the lesson catalogue.
    async fn list_lessons(&self, credential: &Credential) -> Result<Vec<LessonSummary>, ApiError>;
}

/// Shared handle to a lesson service.
pub type SharedService = Arc<dyn LessonService>;

/// Lesson service reached over the backend's JSON API.
#[derive(Debug, Clone)]
pub struct RestLessonService {
    base_url: String,
    client: reqwest::Client,
}

impl RestLessonService {
    /// Creates a client for `base_url` with a per-request timeout.
    #[instrument(skip_all)]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(base_url = %base_url, "Created lesson service client");
        Ok(Self { base_url, client })
    }

    /// Creates a client from configuration.
    #[instrument(skip(config))]
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url().clone(), config.request_timeout())
    }

    /// Base URL every path is joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a response into `T`, or into an [`ApiError`] carrying the
    /// service's `error` message for non-success statuses.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!(status = %status, message = %message, "Lesson service returned an error");
            return Err(ApiError::with_status(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse lesson service response");
            ApiError::with_status(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(ApiError::with_status(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl LessonService for RestLessonService {
    #[instrument(skip_all)]
    async fn verify_credential(&self, credential: &Credential) -> Result<bool, ApiError> {
        debug!("Verifying credential");
        let response = self
            .client
            .post(self.url("/verify-token"))
            .json(&VerifyRequest {
                token: credential.expose().to_string(),
            })
            .send()
            .await?;
        let verdict: VerifyResponse = Self::read_json(response).await?;
        debug!(valid = verdict.valid, "Credential verification answered");
        Ok(verdict.valid)
    }

    #[instrument(skip(self, credential), fields(lesson_id = %id))]
    async fn get_lesson(
        &self,
        credential: &Credential,
        id: &LessonId,
    ) -> Result<Lesson, ApiError> {
        debug!("Fetching lesson");
        let path = format!("/lecciones/{}", urlencoding::encode(id.as_str()));
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(credential.expose())
            .send()
            .await?;
        let record: LessonRecord = Self::read_json(response).await?;
        let lesson = Lesson::try_from(record)
            .map_err(|e| ApiError::new(format!("Malformed lesson record: {}", e)))?;
        info!(pairs = lesson.pair_count(), kind = %lesson.kind(), "Fetched lesson");
        Ok(lesson)
    }

    #[instrument(skip(self, credential))]
    async fn get_profile(
        &self,
        credential: &Credential,
        username: &str,
    ) -> Result<PlayerProfile, ApiError> {
        debug!("Fetching profile");
        let path = format!("/usuarios/{}", urlencoding::encode(username));
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(credential.expose())
            .send()
            .await?;
        let record: ProfileRecord = Self::read_json(response).await?;
        Ok(record.into())
    }

    #[instrument(skip(self, credential), fields(lesson_id = %id))]
    async fn increment_lesson_plays(
        &self,
        credential: &Credential,
        id: &LessonId,
        new_count: u32,
    ) -> Result<(), ApiError> {
        debug!("Updating lesson play counter");
        // The backend routes this update with a trailing slash.
        let path = format!("/lecciones/{}/", urlencoding::encode(id.as_str()));
        let response = self
            .client
            .put(self.url(&path))
            .bearer_auth(credential.expose())
            .json(&PlayCountUpdate {
                play_count: new_count,
            })
            .send()
            .await?;
        Self::expect_success(response).await
    }

    #[instrument(skip(self, credential, update), fields(score = update.score))]
    async fn update_profile(
        &self,
        credential: &Credential,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        debug!("Updating profile");
        let path = format!("/usuarios/{}", urlencoding::encode(username));
        let response = self
            .client
            .put(self.url(&path))
            .bearer_auth(credential.expose())
            .json(update)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    #[instrument(skip_all)]
    async fn list_lessons(&self, credential: &Credential) -> Result<Vec<LessonSummary>, ApiError> {
        debug!("Listing lessons");
        let response = self
            .client
            .get(self.url("/lecciones"))
            .bearer_auth(credential.expose())
            .send()
            .await?;
        let lessons: Vec<LessonSummary> = Self::read_json(response).await?;
        info!(count = lessons.len(), "Listed lessons");
        Ok(lessons)
    }
}

//! Client configuration: where the lesson service lives and how long the
//! games' feedback delays last.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "strictly_lessons.toml";

/// Feedback delays for the three games, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Timings {
    /// How long a mismatched Memory pair stays face up.
    #[serde(default = "default_memory_unflip_ms")]
    memory_unflip_ms: u64,

    /// How long a wrong Fill character stays before the row clears.
    #[serde(default = "default_fill_reset_ms")]
    fill_reset_ms: u64,

    /// How long a wrongly dropped Match chip shakes.
    #[serde(default = "default_match_shake_ms")]
    match_shake_ms: u64,
}

fn default_memory_unflip_ms() -> u64 {
    800
}

fn default_fill_reset_ms() -> u64 {
    1000
}

fn default_match_shake_ms() -> u64 {
    500
}

impl Timings {
    /// Creates timings from explicit millisecond values.
    pub fn new(memory_unflip_ms: u64, fill_reset_ms: u64, match_shake_ms: u64) -> Self {
        Self {
            memory_unflip_ms,
            fill_reset_ms,
            match_shake_ms,
        }
    }

    /// Memory unflip delay.
    pub fn memory_unflip(&self) -> Duration {
        Duration::from_millis(self.memory_unflip_ms)
    }

    /// Fill auto-clear delay.
    pub fn fill_reset(&self) -> Duration {
        Duration::from_millis(self.fill_reset_ms)
    }

    /// Match shake delay.
    pub fn match_shake(&self) -> Duration {
        Duration::from_millis(self.match_shake_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::new(
            default_memory_unflip_ms(),
            default_fill_reset_ms(),
            default_match_shake_ms(),
        )
    }
}

/// Configuration for the lesson client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the lesson service API (no trailing slash needed).
    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Game feedback delays.
    #[serde(default)]
    timings: Timings,
}

fn default_api_base_url() -> String {
    "http://localhost:3060/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            timings: Timings::default(),
        }
    }
}

impl ClientConfig {
    /// Returns a copy pointing at a different API base URL.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(api_base_url = %config.api_base_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the named file, or [`DEFAULT_CONFIG_FILE`] if it exists, or
    /// falls back to defaults.
    ///
    /// A file named explicitly must exist and parse.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

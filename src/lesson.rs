//! Lesson snapshot types shared by the loader, the games, and the reporter.
//!
//! A [`Lesson`] is an immutable copy of the remote record taken once per play
//! session. Construction enforces the word/translation alignment the games
//! rely on, so nothing downstream re-checks it.

use std::fmt;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Which mini-game a lesson is played as.
///
/// The wire tags are the backend's (`Memoria`, `Rellenar`, `Asociar`); the
/// lowercase English names are accepted on the command line.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum GameKind {
    /// Pair-matching: flip two cards, find word + translation.
    #[default]
    #[serde(rename = "Memoria")]
    #[strum(to_string = "memory", serialize = "Memoria")]
    Memory,
    /// Character fill-in: supply the hidden letter of each translation.
    #[serde(rename = "Rellenar")]
    #[strum(to_string = "fill", serialize = "Rellenar")]
    Fill,
    /// Drag-pair: drop each translation next to its word.
    #[serde(rename = "Asociar")]
    #[strum(to_string = "match", serialize = "Asociar")]
    Match,
}

/// Identifier of a lesson on the remote service. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    /// Parses a lesson identifier, returning `None` for blank input.
    ///
    /// A blank identifier means "no lesson chosen", which callers treat as a
    /// redirect to lesson selection rather than as an error.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session credential (bearer token).
///
/// `Debug` is redacted so the token never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token, returning `None` when it is blank.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Returns the raw token for transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A lesson record violates the word/translation alignment.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LessonError {
    /// The lesson has no word pairs at all.
    #[display("Lesson has no word pairs")]
    Empty,
    /// Words and translations are not index-aligned.
    #[display("Lesson has {} words but {} translations", words, translations)]
    Misaligned {
        /// Number of words.
        words: usize,
        /// Number of translations.
        translations: usize,
    },
}

/// Immutable lesson snapshot held for one play session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Lesson {
    id: LessonId,
    language: String,
    words: Vec<String>,
    translations: Vec<String>,
    kind: GameKind,
    play_count: u32,
    author: Option<String>,
}

impl Lesson {
    /// Creates a lesson, enforcing `len(words) == len(translations) >= 1`.
    #[instrument(skip(words, translations), fields(lesson_id = %id, pairs = words.len()))]
    pub fn new(
        id: LessonId,
        language: String,
        words: Vec<String>,
        translations: Vec<String>,
        kind: GameKind,
        play_count: u32,
    ) -> Result<Self, LessonError> {
        if words.len() != translations.len() {
            return Err(LessonError::Misaligned {
                words: words.len(),
                translations: translations.len(),
            });
        }
        if words.is_empty() {
            return Err(LessonError::Empty);
        }
        Ok(Self {
            id,
            language,
            words,
            translations,
            kind,
            play_count,
            author: None,
        })
    }

    /// Attaches the lesson author.
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    /// Number of word/translation pairs (N).
    pub fn pair_count(&self) -> usize {
        self.words.len()
    }

    /// Iterates `(word, translation)` pairs in lesson order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .zip(self.translations.iter())
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }
}

/// The player's profile record, if one could be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PlayerProfile {
    username: String,
    /// Learned languages in the order they were learned, without repeats.
    languages: Vec<String>,
    score: u32,
}

impl PlayerProfile {
    /// Creates a profile snapshot.
    pub fn new(username: String, languages: impl IntoIterator<Item = String>, score: u32) -> Self {
        Self {
            username,
            languages: languages.into_iter().fold(Vec::<String>::new(), |mut seen, language| {
                if !seen.contains(&language) {
                    seen.push(language);
                }
                seen
            }),
            score,
        }
    }

    /// Returns the profile as it should read after winning a lesson in
    /// `language`: the language is appended to the learned list unless it is
    /// already there, and the score goes up by one.
    #[instrument(skip(self), fields(username = %self.username))]
    pub fn after_win(&self, language: &str) -> Self {
        let mut languages = self.languages.clone();
        if !languages.iter().any(|known| known == language) {
            languages.push(language.to_string());
        }
        Self {
            username: self.username.clone(),
            languages,
            score: self.score.saturating_add(1),
        }
    }
}

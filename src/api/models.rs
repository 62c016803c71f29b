//! Wire records exchanged with the lesson service.
//!
//! Field names follow the backend's JSON (`palabras`, `traducciones`, ...);
//! conversions into the domain snapshot types live here so nothing else
//! needs to know them.

use std::str::FromStr;

use derive_getters::Getters;
use serde::{Deserialize, Deserializer, Serialize};

use crate::lesson::{GameKind, Lesson, LessonError, LessonId, PlayerProfile};

/// Reads an explicit `null` as the type's default, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads the game-type tag, falling back to the default game for `null`
/// or a tag this client does not know.
fn lenient_kind<'de, D>(deserializer: D) -> Result<GameKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|tag| GameKind::from_str(tag.trim()).ok())
        .unwrap_or_default())
}

/// Lesson record as returned by `GET /lecciones/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRecord {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Language name.
    #[serde(rename = "idioma")]
    pub language: String,
    /// Words, index-aligned with `translations`.
    #[serde(rename = "palabras")]
    pub words: Vec<String>,
    /// Translations, index-aligned with `words`.
    #[serde(rename = "traducciones")]
    pub translations: Vec<String>,
    /// Play counter.
    #[serde(rename = "jugadas", default, deserialize_with = "null_as_default")]
    pub play_count: u32,
    /// Game-type tag.
    #[serde(rename = "tipo", default, deserialize_with = "lenient_kind")]
    pub kind: GameKind,
    /// Author username.
    #[serde(rename = "autor", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl TryFrom<LessonRecord> for Lesson {
    type Error = LessonError;

    fn try_from(record: LessonRecord) -> Result<Self, Self::Error> {
        // A record without an id cannot be reported against later.
        let id = LessonId::parse(record.id).ok_or(LessonError::Empty)?;
        Ok(Lesson::new(
            id,
            record.language,
            record.words,
            record.translations,
            record.kind,
            record.play_count,
        )?
        .with_author(record.author))
    }
}

/// Lesson catalogue entry as returned by `GET /lecciones`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LessonSummary {
    /// Backend identifier.
    #[serde(rename = "_id")]
    id: String,
    /// Language name.
    #[serde(rename = "idioma")]
    language: String,
    /// Author username.
    #[serde(rename = "autor", default)]
    author: Option<String>,
    /// Play counter.
    #[serde(rename = "jugadas", default, deserialize_with = "null_as_default")]
    play_count: u32,
    /// Game-type tag.
    #[serde(rename = "tipo", default, deserialize_with = "lenient_kind")]
    kind: GameKind,
}

impl LessonSummary {
    /// Creates a catalogue entry.
    pub fn new(
        id: String,
        language: String,
        author: Option<String>,
        play_count: u32,
        kind: GameKind,
    ) -> Self {
        Self {
            id,
            language,
            author,
            play_count,
            kind,
        }
    }
}

/// Profile record as returned by `GET /usuarios/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Username.
    pub username: String,
    /// Learned languages.
    #[serde(rename = "idiomas", default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    /// Score.
    #[serde(rename = "puntos", default, deserialize_with = "null_as_default")]
    pub score: u32,
}

impl From<ProfileRecord> for PlayerProfile {
    fn from(record: ProfileRecord) -> Self {
        PlayerProfile::new(record.username, record.languages, record.score)
    }
}

/// Body of `POST /verify-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// The raw token.
    pub token: String,
}

/// Answer of `POST /verify-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the token is currently valid.
    #[serde(default)]
    pub valid: bool,
}

/// Body of `PUT /lecciones/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCountUpdate {
    /// New play counter value.
    #[serde(rename = "jugadas")]
    pub play_count: u32,
}

/// Body of `PUT /usuarios/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Full learned-language list after the update, in stored order.
    #[serde(rename = "idiomas")]
    pub languages: Vec<String>,
    /// New score.
    #[serde(rename = "puntos")]
    pub score: u32,
}

impl From<&PlayerProfile> for ProfileUpdate {
    fn from(profile: &PlayerProfile) -> Self {
        Self {
            languages: profile.languages().clone(),
            score: *profile.score(),
        }
    }
}

/// Error body the service sends with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_record_uses_backend_field_names() {
        let json = serde_json::json!({
            "_id": "abc123",
            "idioma": "Spanish",
            "palabras": ["dog", "cat"],
            "traducciones": ["perro", "gato"],
            "jugadas": 7,
            "tipo": "Asociar",
            "autor": "ana"
        });
        let record: LessonRecord = serde_json::from_value(json).expect("Record parses");
        let lesson = Lesson::try_from(record).expect("Record is a valid lesson");
        assert_eq!(lesson.id().as_str(), "abc123");
        assert_eq!(*lesson.kind(), GameKind::Match);
        assert_eq!(*lesson.play_count(), 7);
        assert_eq!(lesson.author().as_deref(), Some("ana"));
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let json = serde_json::json!({
            "_id": "abc123",
            "idioma": "Spanish",
            "palabras": ["dog"],
            "traducciones": ["perro"]
        });
        let record: LessonRecord = serde_json::from_value(json).expect("Record parses");
        assert_eq!(record.play_count, 0);
        assert_eq!(record.kind, GameKind::Memory);

        let profile: ProfileRecord =
            serde_json::from_value(serde_json::json!({"username": "ana"})).expect("Profile parses");
        assert!(profile.languages.is_empty());
        assert_eq!(profile.score, 0);
    }

    #[test]
    fn test_null_counters_read_as_defaults() {
        let json = serde_json::json!({
            "_id": "abc123",
            "idioma": "Spanish",
            "palabras": ["dog"],
            "traducciones": ["perro"],
            "jugadas": null,
            "tipo": null,
            "autor": null
        });
        let record: LessonRecord = serde_json::from_value(json).expect("Record parses");
        assert_eq!(record.play_count, 0);
        assert_eq!(record.kind, GameKind::Memory);
        assert!(record.author.is_none());

        let profile: ProfileRecord = serde_json::from_value(serde_json::json!({
            "username": "ana",
            "idiomas": null,
            "puntos": null
        }))
        .expect("Profile parses");
        assert!(profile.languages.is_empty());
        assert_eq!(profile.score, 0);
    }

    #[test]
    fn test_unknown_game_tag_falls_back_to_memory() {
        let summaries: Vec<LessonSummary> = serde_json::from_value(serde_json::json!([
            { "_id": "a", "idioma": "Spanish", "tipo": "Crucigrama", "jugadas": null },
            { "_id": "b", "idioma": "French", "tipo": "rellenar", "jugadas": 4 }
        ]))
        .expect("Catalogue parses");
        assert_eq!(
            summaries,
            vec![
                LessonSummary::new(
                    "a".to_string(),
                    "Spanish".to_string(),
                    None,
                    0,
                    GameKind::Memory
                ),
                LessonSummary::new(
                    "b".to_string(),
                    "French".to_string(),
                    None,
                    4,
                    GameKind::Fill
                ),
            ]
        );
    }

    #[test]
    fn test_profile_update_keeps_language_order() {
        let profile = PlayerProfile::new(
            "ana".to_string(),
            vec!["Spanish".to_string(), "French".to_string()],
            3,
        )
        .after_win("German");
        let value = serde_json::to_value(ProfileUpdate::from(&profile)).expect("Serializes");
        assert_eq!(
            value,
            serde_json::json!({"idiomas": ["Spanish", "French", "German"], "puntos": 4})
        );
    }

    #[test]
    fn test_misaligned_record_is_rejected() {
        let record = LessonRecord {
            id: "x".to_string(),
            language: "Spanish".to_string(),
            words: vec!["dog".to_string()],
            translations: vec![],
            play_count: 0,
            kind: GameKind::Fill,
            author: None,
        };
        assert!(Lesson::try_from(record).is_err());
    }

    #[test]
    fn test_profile_update_serializes_backend_names() {
        let profile = PlayerProfile::new("ana".to_string(), vec!["Spanish".to_string()], 3);
        let value = serde_json::to_value(ProfileUpdate::from(&profile)).expect("Serializes");
        assert_eq!(value, serde_json::json!({"idiomas": ["Spanish"], "puntos": 3}));
    }
}

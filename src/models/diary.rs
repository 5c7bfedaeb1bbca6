//! Diary model
//!
//! The blogger's private journal: one entry per date with an optional
//! weather reference and a mood. The weather table is a seeded dictionary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum diary title length in characters.
pub const DIARY_TITLE_MAX_LEN: usize = 100;

/// Diary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diary {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Comma-separated picture URLs
    pub picture: String,
    pub weather_id: Option<i64>,
    pub mood: Mood,
    /// 1 = normal, 0 = deleted
    pub status: bool,
    /// The date the entry is about
    pub created_at: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

/// Diary entry joined with its weather dictionary row.
#[derive(Debug, Clone)]
pub struct DiaryWithWeather {
    pub diary: Diary,
    pub weather_name: Option<String>,
    pub weather_icon: Option<String>,
}

/// Weather dictionary row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub id: i64,
    pub weather_name: String,
    pub icon: Option<String>,
}

/// Mood of a diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Calm,
    Excited,
    Tired,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Calm => "calm",
            Mood::Excited => "excited",
            Mood::Tired => "tired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "angry" => Some(Mood::Angry),
            "calm" => Some(Mood::Calm),
            "excited" => Some(Mood::Excited),
            "tired" => Some(Mood::Tired),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::Calm
    }
}

/// Input for creating a diary entry
#[derive(Debug, Clone)]
pub struct CreateDiaryInput {
    pub title: String,
    pub content: String,
    pub picture: String,
    pub weather_id: Option<i64>,
    pub mood: Mood,
    pub created_at: NaiveDate,
}

/// Input for a partial diary update
#[derive(Debug, Clone, Default)]
pub struct UpdateDiaryInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub picture: Option<String>,
    pub weather_id: Option<i64>,
    pub mood: Option<Mood>,
}

impl UpdateDiaryInput {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.picture.is_some()
            || self.weather_id.is_some()
            || self.mood.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_roundtrip() {
        for mood in [
            Mood::Happy,
            Mood::Sad,
            Mood::Angry,
            Mood::Calm,
            Mood::Excited,
            Mood::Tired,
        ] {
            assert_eq!(Mood::from_str(mood.as_str()), Some(mood));
        }
        assert_eq!(Mood::from_str("bored"), None);
    }

    #[test]
    fn test_default_mood_is_calm() {
        assert_eq!(Mood::default(), Mood::Calm);
    }
}

//! Mood journal entry DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_core::mood::{Mood, MoodEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryDto {
    /// ISO-8601 timestamp.
    pub date: DateTime<Utc>,
    /// `null` for entries recorded without a mood.
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MoodEntryDto {
    pub fn into_domain(self) -> MoodEntry {
        MoodEntry {
            date: self.date,
            mood: self.mood,
            notes: self.notes,
        }
    }
}

impl From<&MoodEntry> for MoodEntryDto {
    fn from(entry: &MoodEntry) -> Self {
        MoodEntryDto {
            date: entry.date,
            mood: entry.mood,
            notes: entry.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_browser_style_timestamps() {
        let raw = r#"{"date":"2024-10-15T09:30:00.000Z","mood":"good","notes":"walked"}"#;
        let entry = serde_json::from_str::<MoodEntryDto>(raw).unwrap().into_domain();
        assert_eq!(entry.date, Utc.with_ymd_and_hms(2024, 10, 15, 9, 30, 0).unwrap());
        assert_eq!(entry.mood, Some(Mood::Good));
        assert_eq!(entry.notes.as_deref(), Some("walked"));
    }

    #[test]
    fn test_null_mood_is_accepted() {
        let raw = r#"{"date":"2024-10-15T09:30:00Z","mood":null}"#;
        let entry = serde_json::from_str::<MoodEntryDto>(raw).unwrap().into_domain();
        assert_eq!(entry.mood, None);
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_unknown_mood_is_rejected() {
        let raw = r#"{"date":"2024-10-15T09:30:00Z","mood":"ecstatic"}"#;
        assert!(serde_json::from_str::<MoodEntryDto>(raw).is_err());
    }

    #[test]
    fn test_absent_notes_are_not_written() {
        let entry = MoodEntry::new(Utc::now(), Mood::Okay, None);
        let json = serde_json::to_string(&MoodEntryDto::from(&entry)).unwrap();
        assert!(!json.contains("notes"));
    }
}

//! Mood domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One of the five selectable moods, best first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mood {
    Great,
    Good,
    Okay,
    Bad,
    Awful,
}

impl Mood {
    /// Ordinal used for averaging: awful=1 .. great=5.
    pub fn ordinal(self) -> u8 {
        match self {
            Mood::Awful => 1,
            Mood::Bad => 2,
            Mood::Okay => 3,
            Mood::Good => 4,
            Mood::Great => 5,
        }
    }

    /// Inverse of [`Mood::ordinal`].
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Mood::iter().find(|mood| mood.ordinal() == ordinal)
    }

    /// Maps a (possibly fractional) average back to the nearest mood.
    pub fn from_average(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round().clamp(1.0, 5.0) as u8;
        Self::from_ordinal(rounded)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Great => "Great",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Bad => "Bad",
            Mood::Awful => "Awful",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Great => "😄",
            Mood::Good => "🙂",
            Mood::Okay => "😐",
            Mood::Bad => "😔",
            Mood::Awful => "😭",
        }
    }
}

/// A single journal entry. Immutable once recorded.
///
/// `mood` is optional because entries written by older builds may carry
/// `null`; new entries always have a mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: DateTime<Utc>,
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MoodEntry {
    /// Creates an entry stamped `date`. Blank notes are dropped.
    pub fn new(date: DateTime<Utc>, mood: Mood, notes: Option<String>) -> Self {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self {
            date,
            mood: Some(mood),
            notes,
        }
    }
}

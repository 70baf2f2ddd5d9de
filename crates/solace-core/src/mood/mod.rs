//! Mood journal domain module.
//!
//! - `model`: moods and journal entries
//! - `trend`: calendar-day trend and dominant-mood aggregation

mod model;
mod trend;

pub use model::{Mood, MoodEntry};
pub use trend::{DEFAULT_TREND_DAYS, TrendPoint, dominant_mood, trend};

//! Mood journal: selection, recording and aggregation.

use chrono::{DateTime, Local, TimeZone, Utc};

use solace_core::error::{Result, SolaceError};
use solace_core::mood::{self, Mood, MoodEntry, TrendPoint};

use crate::state_store::{Slice, StateStore};

#[derive(Debug, Clone)]
pub struct MoodJournal {
    store: StateStore,
}

impl MoodJournal {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Sets the current mood without recording an entry.
    pub fn select(&self, mood: Mood) {
        self.store.mutate_transient(|state| state.current_mood = Some(mood));
        tracing::debug!(%mood, "Mood selected");
    }

    pub fn current_mood(&self) -> Option<Mood> {
        self.store.read(|state| state.current_mood)
    }

    /// Appends an entry stamped now and makes `mood` the current mood.
    ///
    /// Fails with a validation error, leaving the history untouched, when no
    /// mood is given.
    pub fn record(&self, mood: Option<Mood>, notes: Option<&str>) -> Result<MoodEntry> {
        self.record_at(Utc::now(), mood, notes)
    }

    pub(crate) fn record_at(
        &self,
        date: DateTime<Utc>,
        mood: Option<Mood>,
        notes: Option<&str>,
    ) -> Result<MoodEntry> {
        let Some(mood) = mood else {
            return Err(SolaceError::validation("Please select a mood"));
        };
        let entry = MoodEntry::new(date, mood, notes.map(str::to_string));

        let recorded = entry.clone();
        self.store.mutate(&[Slice::MoodHistory], move |state| {
            state.mood_history.push(recorded);
            state.current_mood = Some(mood);
            Ok(())
        })?;

        tracing::debug!(%mood, has_notes = entry.notes.is_some(), "Mood recorded");
        Ok(entry)
    }

    /// Per-day averages for the last `days` local calendar days, oldest first.
    pub fn trend(&self, days: u32) -> Vec<TrendPoint> {
        self.trend_at(days, &Local::now())
    }

    pub fn trend_at<Tz: TimeZone>(&self, days: u32, now: &DateTime<Tz>) -> Vec<TrendPoint> {
        self.store.read(|state| mood::trend(&state.mood_history, days, now))
    }

    pub fn dominant_mood(&self) -> Option<Mood> {
        self.store.read(|state| mood::dominant_mood(&state.mood_history))
    }

    pub fn history(&self) -> Vec<MoodEntry> {
        self.store.read(|state| state.mood_history.clone())
    }
}

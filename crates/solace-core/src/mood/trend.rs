//! Read-side aggregation over the mood history.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::model::{Mood, MoodEntry};

/// Default window for [`trend`].
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// One calendar-day bucket of the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short axis label, e.g. "Oct 15".
    pub label: String,
    /// Mean mood ordinal for the day. `None` means no entry, which is a gap
    /// in the chart and not the worst mood.
    pub value: Option<f64>,
}

impl TrendPoint {
    /// The day's average rounded back to a discrete mood.
    pub fn mood(&self) -> Option<Mood> {
        self.value.and_then(Mood::from_average)
    }
}

/// Averages the history into `days` calendar-day buckets ending at `now`.
///
/// Buckets are oldest first and include the day of `now`. Entries are assigned
/// to days in `now`'s time zone. Entries without a mood do not contribute.
pub fn trend<Tz: TimeZone>(entries: &[MoodEntry], days: u32, now: &DateTime<Tz>) -> Vec<TrendPoint> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut buckets: HashMap<NaiveDate, (u32, u32)> = HashMap::new();
    for entry in entries {
        let Some(mood) = entry.mood else { continue };
        let day = entry.date.with_timezone(&tz).date_naive();
        let bucket = buckets.entry(day).or_insert((0, 0));
        bucket.0 += u32::from(mood.ordinal());
        bucket.1 += 1;
    }

    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| {
            let value = buckets
                .get(&date)
                .map(|(sum, count)| f64::from(*sum) / f64::from(*count));
            TrendPoint {
                date,
                label: date.format("%b %d").to_string(),
                value,
            }
        })
        .collect()
}

/// The mood recorded most often across the whole history.
///
/// Ties go to whichever of the tied moods appears first in the history.
pub fn dominant_mood(entries: &[MoodEntry]) -> Option<Mood> {
    // Vec keeps first-seen order for the tie-break.
    let mut counts: Vec<(Mood, usize)> = Vec::new();
    for mood in entries.iter().filter_map(|e| e.mood) {
        match counts.iter_mut().find(|(m, _)| *m == mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((mood, 1)),
        }
    }

    let mut best: Option<(Mood, usize)> = None;
    for (mood, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((mood, count));
        }
    }
    best.map(|(mood, _)| mood)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry_at(date: DateTime<Utc>, mood: Mood) -> MoodEntry {
        MoodEntry::new(date, mood, None)
    }

    fn noon_utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history_is_all_gaps() {
        let now = noon_utc(2026, 10, 15);
        let points = trend(&[], 7, &now);
        assert_eq!(points.len(), 7);
        assert!(points.iter().all(|p| p.value.is_none()));
        assert_eq!(points[6].date, now.date_naive());
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
    }

    #[test]
    fn test_single_great_entry_today() {
        let now = noon_utc(2026, 10, 15);
        let entries = vec![entry_at(now - Duration::hours(2), Mood::Great)];
        let points = trend(&entries, 7, &now);
        assert_eq!(points[6].value, Some(5.0));
        assert_eq!(points[6].mood(), Some(Mood::Great));
        assert!(points[..6].iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn test_day_average_is_fractional() {
        let now = noon_utc(2026, 10, 15);
        let yesterday = now - Duration::days(1);
        let entries = vec![
            entry_at(yesterday, Mood::Great),
            entry_at(yesterday, Mood::Good),
            entry_at(yesterday, Mood::Good),
            entry_at(yesterday, Mood::Bad),
        ];
        let points = trend(&entries, 7, &now);
        // (5 + 4 + 4 + 2) / 4
        assert_eq!(points[5].value, Some(3.75));
        assert_eq!(points[5].mood(), Some(Mood::Good));
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let now = noon_utc(2026, 10, 15);
        let entries = vec![entry_at(now - Duration::days(7), Mood::Awful)];
        let points = trend(&entries, 7, &now);
        assert!(points.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn test_moodless_entries_do_not_count() {
        let now = noon_utc(2026, 10, 15);
        let mut blank = entry_at(now, Mood::Okay);
        blank.mood = None;
        let entries = vec![blank, entry_at(now, Mood::Good)];
        let points = trend(&entries, 1, &now);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, Some(4.0));
    }

    #[test]
    fn test_label_format() {
        let now = noon_utc(2026, 10, 5);
        let points = trend(&[], 1, &now);
        assert_eq!(points[0].label, "Oct 05");
    }

    #[test]
    fn test_zero_days() {
        assert!(trend(&[], 0, &Utc::now()).is_empty());
    }

    #[test]
    fn test_dominant_mood_counts() {
        let now = Utc::now();
        let mut entries = Vec::new();
        entries.extend((0..2).map(|_| entry_at(now, Mood::Bad)));
        entries.extend((0..5).map(|_| entry_at(now, Mood::Good)));
        assert_eq!(dominant_mood(&entries), Some(Mood::Good));
    }

    #[test]
    fn test_dominant_mood_tie_goes_to_first_seen() {
        let now = Utc::now();
        let entries = vec![
            entry_at(now, Mood::Okay),
            entry_at(now, Mood::Great),
            entry_at(now, Mood::Great),
            entry_at(now, Mood::Okay),
        ];
        assert_eq!(dominant_mood(&entries), Some(Mood::Okay));
    }

    #[test]
    fn test_dominant_mood_empty() {
        assert_eq!(dominant_mood(&[]), None);
    }
}

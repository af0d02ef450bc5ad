//! Bounded, throttled time series of overall health scores.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Most entries kept per plant; the oldest are evicted first.
pub const MAX_HISTORY: usize = 30;

/// An unchanged score is recorded again only after this many minutes.
pub const REPEAT_AFTER_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub score: u8,
}

/// Oldest-first score history of one plant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthHistory {
    entries: VecDeque<HistoryEntry>,
}

impl HealthHistory {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `score` at `now` unless it repeats the latest score within
    /// the repeat window. Returns whether an entry was appended.
    pub fn record(&mut self, score: u8, now: DateTime<Utc>) -> bool {
        // ---
        if let Some(last) = self.entries.back() {
            let unchanged = last.score == score;
            let recent = now - last.timestamp <= Duration::minutes(REPEAT_AFTER_MINUTES);
            if unchanged && recent {
                return false;
            }
        }

        self.entries.push_back(HistoryEntry { timestamp: now, score });
        while self.entries.len() > MAX_HISTORY {
            self.entries.pop_front();
        }

        tracing::debug!("Recorded health score {} ({} entries)", score, self.entries.len());
        true
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_identical_score_within_a_minute_appends_once() {
        // ---
        let mut history = HealthHistory::new();

        assert!(history.record(85, start()));
        assert!(!history.record(85, start() + Duration::seconds(30)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_changed_score_always_appends() {
        // ---
        let mut history = HealthHistory::new();

        assert!(history.record(85, start()));
        assert!(history.record(84, start() + Duration::seconds(1)));
        assert!(history.record(85, start() + Duration::seconds(2)));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_identical_score_appends_after_an_hour() {
        // ---
        let mut history = HealthHistory::new();
        history.record(70, start());

        assert!(!history.record(70, start() + Duration::minutes(60)));
        assert!(history.record(70, start() + Duration::minutes(61)));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().timestamp, start() + Duration::minutes(61));
    }

    #[test]
    fn test_capped_with_oldest_evicted_first() {
        // ---
        let mut history = HealthHistory::new();
        for i in 0..100u8 {
            history.record(i, start() + Duration::minutes(i as i64));
            assert!(history.len() <= MAX_HISTORY);
        }

        assert_eq!(history.len(), MAX_HISTORY);
        let scores: Vec<u8> = history.iter().map(|e| e.score).collect();
        assert_eq!(scores, (70..100).collect::<Vec<u8>>());
    }

    #[test]
    fn test_repeated_calls_do_not_grow() {
        // ---
        let mut history = HealthHistory::new();
        for s in 0..1000 {
            history.record(90, start() + Duration::seconds(s));
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_sequence() {
        // ---
        let mut history = HealthHistory::new();
        history.record(90, start());

        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value[0]["score"], 90);
        assert_eq!(value[0]["timestamp"], "2025-03-26T12:00:00Z");
    }
}

//! Piecewise health scoring of a plant's latest reading.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CareProfile;
use crate::models::{ReadingTime, SensorSnapshot};

// ---

/// Ideal soil moisture window, percent.
pub const MOISTURE_IDEAL: (f64, f64) = (40.0, 80.0);

/// Temperature window used when the catalog gives none, °F.
pub const DEFAULT_TEMPERATURE_IDEAL: (f64, f64) = (60.0, 80.0);

/// A reading this many minutes old has no freshness left.
pub const FRESHNESS_WINDOW_MINUTES: f64 = 120.0;

/// Score for a component that cannot be evaluated.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Penalty span used when half the bound is not positive.
const FALLBACK_SPAN: f64 = 50.0;

/// Score one metric against its ideal window, on 0-100.
///
/// With `lower_is_better` the score falls linearly from 100 at `min` to 0
/// at `max`. Otherwise the whole window scores 100 and the score falls
/// linearly outside it, reaching 0 at `min * 0.5` below and `max * 1.5`
/// above. A missing value or window scores [`NEUTRAL_SCORE`].
pub fn component_score(value: Option<f64>, bounds: Option<(f64, f64)>, lower_is_better: bool) -> f64 {
    // ---
    let (Some(value), Some((min, max))) = (value, bounds) else {
        return NEUTRAL_SCORE;
    };
    if value.is_nan() {
        return NEUTRAL_SCORE;
    }

    if lower_is_better {
        if value <= min {
            return 100.0;
        }
        if value >= max {
            return 0.0;
        }
        return 100.0 - (value - min) / (max - min) * 100.0;
    }

    if value < min {
        let span = positive_or_fallback(min * 0.5);
        (100.0 - (min - value) / span * 100.0).max(0.0)
    } else if value > max {
        let span = positive_or_fallback(max * 0.5);
        (100.0 - (value - max) / span * 100.0).max(0.0)
    } else {
        100.0
    }
}

fn positive_or_fallback(span: f64) -> f64 {
    if span > 0.0 {
        span
    } else {
        FALLBACK_SPAN
    }
}

/// Categorical reading of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "No data")]
    NoData,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    // ---
    pub fn from_score(score: u8) -> Self {
        Self::from_mean(f64::from(score))
    }

    /// Status of an unrounded mean: 79.7 is still `Good`.
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 80.0 {
            HealthStatus::Excellent
        } else if mean >= 60.0 {
            HealthStatus::Good
        } else if mean >= 40.0 {
            HealthStatus::Fair
        } else {
            HealthStatus::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::NoData => "No data",
            HealthStatus::NeedsAttention => "Needs Attention",
            HealthStatus::Fair => "Fair",
            HealthStatus::Good => "Good",
            HealthStatus::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub moisture: f64,
    pub temperature: f64,
    pub freshness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    pub overall_score: u8,
    pub status: HealthStatus,
    /// `None` when there was no reading to score.
    pub sub_scores: Option<SubScores>,
}

impl HealthAssessment {
    // ---
    /// Unweighted mean of the three components, rounded half to even.
    /// The status is keyed on the mean before rounding.
    pub fn from_sub_scores(sub_scores: SubScores) -> Self {
        // ---
        let mean = (sub_scores.moisture + sub_scores.temperature + sub_scores.freshness) / 3.0;
        let overall_score = mean.round_ties_even().clamp(0.0, 100.0) as u8;

        HealthAssessment {
            overall_score,
            status: HealthStatus::from_mean(mean),
            sub_scores: Some(sub_scores),
        }
    }

    pub fn no_data() -> Self {
        HealthAssessment {
            overall_score: 0,
            status: HealthStatus::NoData,
            sub_scores: None,
        }
    }
}

/// Values the scorer works from, already extracted from a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthInputs {
    pub moisture: Option<f64>,
    pub temperature: Option<f64>,
    /// Falls back to [`DEFAULT_TEMPERATURE_IDEAL`] when absent.
    pub ideal_temperature: Option<(f64, f64)>,
    pub minutes_ago: Option<f64>,
}

/// Turns readings into assessments. Pure apart from the zone it reads
/// naive timestamps in.
#[derive(Debug, Clone, Copy)]
pub struct HealthScorer {
    local_zone: FixedOffset,
}

impl HealthScorer {
    // ---
    pub fn new(local_zone: FixedOffset) -> Self {
        HealthScorer { local_zone }
    }

    pub fn local_zone(&self) -> FixedOffset {
        self.local_zone
    }

    pub fn score(&self, inputs: &HealthInputs) -> HealthAssessment {
        // ---
        let temperature_ideal = inputs.ideal_temperature.unwrap_or(DEFAULT_TEMPERATURE_IDEAL);

        HealthAssessment::from_sub_scores(SubScores {
            moisture: component_score(inputs.moisture, Some(MOISTURE_IDEAL), false),
            temperature: component_score(inputs.temperature, Some(temperature_ideal), false),
            freshness: component_score(
                inputs.minutes_ago,
                Some((0.0, FRESHNESS_WINDOW_MINUTES)),
                true,
            ),
        })
    }

    /// Assess a reading against the plant's care profile at `now`.
    pub fn assess(
        &self,
        snapshot: Option<&SensorSnapshot>,
        care: Option<&CareProfile>,
        now: DateTime<Utc>,
    ) -> HealthAssessment {
        // ---
        let Some(snapshot) = snapshot else {
            return HealthAssessment::no_data();
        };

        let inputs = HealthInputs {
            moisture: snapshot.moisture,
            temperature: snapshot.temperature,
            ideal_temperature: care.and_then(CareProfile::ideal_temperature),
            minutes_ago: snapshot
                .timestamp
                .as_ref()
                .and_then(|ts| self.minutes_since(ts, now)),
        };

        self.score(&inputs)
    }

    /// Minutes from `ts` to `now`; naive timestamps are read in the local zone.
    pub fn minutes_since(&self, ts: &ReadingTime, now: DateTime<Utc>) -> Option<f64> {
        let then = ts.to_utc(self.local_zone)?;
        Some((now - then).num_milliseconds() as f64 / 60_000.0)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn scorer() -> HealthScorer {
        HealthScorer::new(FixedOffset::west_opt(5 * 3600).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
    }

    #[test]
    fn test_inside_window_scores_full() {
        // ---
        for value in [40.0, 55.5, 80.0] {
            assert_eq!(component_score(Some(value), Some((40.0, 80.0)), false), 100.0);
        }
    }

    #[test]
    fn test_just_outside_window_is_partial() {
        // ---
        let below = component_score(Some(39.9), Some((40.0, 80.0)), false);
        let above = component_score(Some(80.1), Some((40.0, 80.0)), false);

        assert!(below > 0.0 && below < 100.0);
        assert!(above > 0.0 && above < 100.0);
    }

    #[test]
    fn test_penalty_reaches_zero_at_span_edges() {
        // ---
        // below: zero at min * 0.5 = 20, halfway at 30
        assert_eq!(component_score(Some(30.0), Some((40.0, 80.0)), false), 50.0);
        assert_eq!(component_score(Some(20.0), Some((40.0, 80.0)), false), 0.0);
        assert_eq!(component_score(Some(5.0), Some((40.0, 80.0)), false), 0.0);

        // above: zero at max * 1.5 = 120, halfway at 100
        assert_eq!(component_score(Some(100.0), Some((40.0, 80.0)), false), 50.0);
        assert_eq!(component_score(Some(120.0), Some((40.0, 80.0)), false), 0.0);
    }

    #[test]
    fn test_monotone_away_from_window() {
        // ---
        let bounds = Some((65.0, 85.0));
        let mut last = 100.0;
        for step in 0..60 {
            let score = component_score(Some(65.0 - step as f64), bounds, false);
            assert!(score <= last);
            last = score;
        }

        let mut last = 100.0;
        for step in 0..60 {
            let score = component_score(Some(85.0 + step as f64), bounds, false);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_non_positive_min_uses_fallback_span() {
        // ---
        assert_eq!(component_score(Some(-25.0), Some((0.0, 10.0)), false), 50.0);
        assert_eq!(component_score(Some(-50.0), Some((0.0, 10.0)), false), 0.0);
    }

    #[test]
    fn test_missing_inputs_are_neutral() {
        // ---
        assert_eq!(component_score(None, Some((40.0, 80.0)), false), NEUTRAL_SCORE);
        assert_eq!(component_score(Some(60.0), None, false), NEUTRAL_SCORE);
        assert_eq!(component_score(Some(f64::NAN), Some((0.0, 1.0)), true), NEUTRAL_SCORE);
    }

    #[test]
    fn test_freshness_decays_linearly() {
        // ---
        let window = Some((0.0, FRESHNESS_WINDOW_MINUTES));

        assert_eq!(component_score(Some(-3.0), window, true), 100.0);
        assert_eq!(component_score(Some(0.0), window, true), 100.0);
        assert_eq!(component_score(Some(60.0), window, true), 50.0);
        assert_eq!(component_score(Some(120.0), window, true), 0.0);
        assert_eq!(component_score(Some(500.0), window, true), 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        // ---
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(80), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(79), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(59), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(40), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(39), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::from_score(0), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::NeedsAttention.to_string(), "Needs Attention");
    }

    #[test]
    fn test_aggregate_is_rounded_mean() {
        // ---
        let perfect = HealthAssessment::from_sub_scores(SubScores {
            moisture: 100.0,
            temperature: 100.0,
            freshness: 100.0,
        });
        assert_eq!(perfect.overall_score, 100);
        assert_eq!(perfect.status, HealthStatus::Excellent);

        let mixed = HealthAssessment::from_sub_scores(SubScores {
            moisture: 100.0,
            temperature: 50.0,
            freshness: 0.0,
        });
        assert_eq!(mixed.overall_score, 50);
        assert_eq!(mixed.status, HealthStatus::Fair);

        // mean 82.5 rounds to the even neighbour
        let tie = HealthAssessment::from_sub_scores(SubScores {
            moisture: 100.0,
            temperature: 100.0,
            freshness: 47.5,
        });
        assert_eq!(tie.overall_score, 82);
    }

    #[test]
    fn test_status_uses_mean_before_rounding() {
        // ---
        // mean 79.67 rounds to 80 but stays Good
        let just_below_excellent = HealthAssessment::from_sub_scores(SubScores {
            moisture: 100.0,
            temperature: 100.0,
            freshness: 39.0,
        });
        assert_eq!(just_below_excellent.overall_score, 80);
        assert_eq!(just_below_excellent.status, HealthStatus::Good);

        // mean 59.67 rounds to 60 but stays Fair
        let just_below_good = HealthAssessment::from_sub_scores(SubScores {
            moisture: 100.0,
            temperature: 40.0,
            freshness: 39.0,
        });
        assert_eq!(just_below_good.overall_score, 60);
        assert_eq!(just_below_good.status, HealthStatus::Fair);

        assert_eq!(HealthStatus::from_mean(39.99), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::from_mean(40.0), HealthStatus::Fair);
    }

    #[test]
    fn test_perfect_inputs_score_full() {
        // ---
        let assessment = scorer().score(&HealthInputs {
            moisture: Some(40.0),
            temperature: Some(70.0),
            ideal_temperature: None,
            minutes_ago: Some(0.0),
        });

        assert_eq!(assessment.overall_score, 100);
        assert_eq!(assessment.status, HealthStatus::Excellent);
    }

    #[test]
    fn test_fresh_reading_within_catalog_range() {
        // ---
        let assessment = scorer().score(&HealthInputs {
            moisture: Some(60.0),
            temperature: Some(72.0),
            ideal_temperature: Some((65.0, 85.0)),
            minutes_ago: Some(10.0),
        });
        let sub = assessment.sub_scores.unwrap();

        assert_eq!(sub.moisture, 100.0);
        assert_eq!(sub.temperature, 100.0);
        assert!((sub.freshness - 91.666).abs() < 0.01);
        assert_eq!(assessment.overall_score, 97);
        assert_eq!(assessment.status, HealthStatus::Excellent);
    }

    #[test]
    fn test_no_snapshot_is_no_data() {
        // ---
        let assessment = scorer().assess(None, None, now());

        assert_eq!(assessment.overall_score, 0);
        assert_eq!(assessment.status, HealthStatus::NoData);
        assert_ne!(assessment.status, HealthStatus::NeedsAttention);
        assert!(assessment.sub_scores.is_none());
    }

    #[test]
    fn test_naive_timestamp_read_in_local_zone() {
        // ---
        // 13:35 local (UTC-5) is ten minutes before 18:45 UTC
        let naive = NaiveDate::from_ymd_opt(2025, 3, 26)
            .unwrap()
            .and_hms_opt(13, 35, 0)
            .unwrap();
        let snapshot = SensorSnapshot {
            moisture: Some(60.0),
            temperature: Some(72.0),
            timestamp: Some(ReadingTime::Naive(naive)),
        };

        let minutes = scorer()
            .minutes_since(snapshot.timestamp.as_ref().unwrap(), now())
            .unwrap();
        assert_eq!(minutes, 10.0);

        let care = CareProfile {
            temperature_range: Some("65-85°F".to_string()),
            ..Default::default()
        };
        let assessment = scorer().assess(Some(&snapshot), Some(&care), now());
        assert_eq!(assessment.overall_score, 97);
    }

    #[test]
    fn test_unparseable_range_uses_default() {
        // ---
        let care = CareProfile {
            temperature_range: Some("warm and bright".to_string()),
            ..Default::default()
        };
        let snapshot = SensorSnapshot {
            moisture: Some(60.0),
            temperature: Some(84.0),
            timestamp: Some(now().into()),
        };

        let assessment = scorer().assess(Some(&snapshot), Some(&care), now());
        let sub = assessment.sub_scores.unwrap();

        // 84°F is 4 above the default 80 max; zero at 120
        assert_eq!(sub.temperature, 90.0);
        assert_eq!(sub.freshness, 100.0);
    }

    #[test]
    fn test_missing_fields_inside_snapshot_are_neutral() {
        // ---
        let assessment = scorer().assess(Some(&SensorSnapshot::default()), None, now());

        assert_eq!(
            assessment.sub_scores,
            Some(SubScores {
                moisture: 50.0,
                temperature: 50.0,
                freshness: 50.0
            })
        );
        assert_eq!(assessment.overall_score, 50);
        assert_eq!(assessment.status, HealthStatus::Fair);
    }
}

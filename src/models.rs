//! Input records handed to the engine by its collaborators.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::normalize_name;

// ---

/// Longest query term, in chars, handed to fuzzy matching. Plant names are
/// far shorter; longer input is cut so scoring cost stays bounded.
pub const MAX_QUERY_TERM_CHARS: usize = 256;

/// Result of an external plant identification attempt.
///
/// When `error` is set the identification failed upstream and no
/// resolution is attempted at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    // ---
    #[serde(default, alias = "scientific_name")]
    pub scientific_name: Option<String>,

    #[serde(default, alias = "common_name")]
    pub common_name: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IdentificationResult {
    // ---
    pub fn failed(message: impl Into<String>) -> Self {
        IdentificationResult {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Normalized scientific name, `None` when absent or blank.
    pub fn scientific_key(&self) -> Option<String> {
        normalized(self.scientific_name.as_deref())
    }

    /// Normalized common name, `None` when absent or blank.
    pub fn common_key(&self) -> Option<String> {
        normalized(self.common_name.as_deref())
    }

    /// Non-empty normalized query terms in probe order: scientific, then
    /// common. Each is cut to [`MAX_QUERY_TERM_CHARS`].
    pub fn query_terms(&self) -> Vec<String> {
        self.scientific_key()
            .into_iter()
            .chain(self.common_key())
            .map(|term| match term.char_indices().nth(MAX_QUERY_TERM_CHARS) {
                Some((cut, _)) => term[..cut].to_string(),
                None => term,
            })
            .collect()
    }
}

/// Zoned forms tried in order: RFC 3339, then a space-separated variant.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// When a reading was taken.
///
/// Zoned timestamps are exact. Naive timestamps carry no zone and are read
/// in the configured local zone. Numbers are Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingTime {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Epoch(f64),
}

impl ReadingTime {
    // ---
    /// Read a timestamp from loosely typed JSON.
    ///
    /// Strings are tried as zoned, then naive (`T` or space separated), then
    /// as a number. Numbers are epoch seconds. Anything else is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        // ---
        match value {
            Value::Number(n) => n.as_f64().filter(|s| s.is_finite()).map(ReadingTime::Epoch),
            Value::String(s) => Self::parse(s.trim()),
            _ => None,
        }
    }

    fn parse(text: &str) -> Option<Self> {
        // ---
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ReadingTime::Zoned(ts));
        }
        if let Some(ts) = ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        {
            return Some(ReadingTime::Zoned(ts));
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        {
            return Some(ReadingTime::Naive(naive));
        }

        text.parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .map(ReadingTime::Epoch)
    }

    /// Resolve to an instant, reading naive values in `local`.
    ///
    /// Returns `None` only for epoch values outside chrono's range.
    pub fn to_utc(&self, local: FixedOffset) -> Option<DateTime<Utc>> {
        // ---
        match *self {
            ReadingTime::Zoned(ts) => Some(ts.with_timezone(&Utc)),
            ReadingTime::Naive(naive) => local
                .from_local_datetime(&naive)
                .single()
                .map(|ts| ts.with_timezone(&Utc)),
            ReadingTime::Epoch(secs) => {
                if !secs.is_finite() {
                    return None;
                }
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9) as u32;
                DateTime::from_timestamp(whole as i64, nanos)
            }
        }
    }
}

impl From<DateTime<Utc>> for ReadingTime {
    fn from(ts: DateTime<Utc>) -> Self {
        ReadingTime::Zoned(ts.fixed_offset())
    }
}

/// One environmental reading for a plant. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    // ---
    /// Soil moisture, percent.
    #[serde(default, alias = "moisture_value", alias = "moistureLevel")]
    pub moisture: Option<f64>,

    /// Temperature in °F.
    #[serde(default, alias = "temperature_value")]
    pub temperature: Option<f64>,

    /// Unreadable timestamps degrade to absent rather than rejecting the
    /// whole reading.
    #[serde(default, deserialize_with = "lenient_reading_time")]
    pub timestamp: Option<ReadingTime>,
}

fn lenient_reading_time<'de, D>(deserializer: D) -> Result<Option<ReadingTime>, D::Error>
where
    D: Deserializer<'de>,
{
    // ---
    let value = Value::deserialize(deserializer)?;
    let parsed = ReadingTime::from_value(&value);
    if parsed.is_none() && !value.is_null() {
        tracing::debug!("Unreadable reading timestamp {}, treating as absent", value);
    }
    Ok(parsed)
}

/// A reading as kept by the telemetry store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredReading {
    pub plant_id: uuid::Uuid,
    pub moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl StoredReading {
    pub fn to_snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            moisture: self.moisture,
            temperature: self.temperature,
            timestamp: Some(self.recorded_at.into()),
        }
    }
}

fn normalized(name: Option<&str>) -> Option<String> {
    name.map(normalize_name).filter(|n| !n.is_empty())
}

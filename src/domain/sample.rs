// Raw history samples and day bucketing
use chrono::{DateTime, NaiveDate, Utc};

/// One record as it comes back from the history source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: String,
    pub value: String,
}

impl RawSample {
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedSample {
    pub day: NaiveDate,
    pub value: f64,
}

impl ParsedSample {
    pub fn new(day: NaiveDate, value: f64) -> Self {
        Self { day, value }
    }
}

/// A sample whose value parsed, still carrying its instant so same-day
/// collisions can be resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl TimedSample {
    pub fn day(&self) -> NaiveDate {
        day_key(self.at)
    }
}

/// Parse a decimal price. Sentinels like "unknown" simply fail to parse.
pub fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Returns `None` for anything that should be dropped from the series.
pub fn parse_sample(raw: &RawSample) -> Option<TimedSample> {
    let value = parse_value(&raw.value)?;
    let at = parse_timestamp(&raw.timestamp)?;
    Some(TimedSample { at, value })
}

/// Calendar day in UTC, so stations in different zones share one axis.
pub fn day_key(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

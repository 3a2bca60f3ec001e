// Per-station price series, the shared day axis, and alignment onto it
use super::sample::{parse_sample, ParsedSample, RawSample, TimedSample};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub station_id: String,
    /// Chronological, at most one sample per day.
    pub samples: Vec<ParsedSample>,
    /// Raw records that failed to parse.
    pub dropped: usize,
}

impl Series {
    pub fn empty(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            samples: Vec::new(),
            dropped: 0,
        }
    }

    /// Parse and bucket a station's raw history. The latest sample of a day
    /// wins; identical instants fall back to input order.
    pub fn from_raw(station_id: impl Into<String>, raw: &[RawSample]) -> Self {
        let mut by_day: BTreeMap<NaiveDate, TimedSample> = BTreeMap::new();
        let mut dropped = 0;

        for record in raw {
            let Some(sample) = parse_sample(record) else {
                dropped += 1;
                continue;
            };
            by_day
                .entry(sample.day())
                .and_modify(|kept| {
                    if sample.at >= kept.at {
                        *kept = sample;
                    }
                })
                .or_insert(sample);
        }

        let samples = by_day
            .into_iter()
            .map(|(day, s)| ParsedSample::new(day, s.value))
            .collect();

        Self {
            station_id: station_id.into(),
            samples,
            dropped,
        }
    }

    pub fn value_on(&self, day: NaiveDate) -> Option<f64> {
        self.samples
            .binary_search_by(|s| s.day.cmp(&day))
            .ok()
            .map(|i| self.samples[i].value)
    }
}

/// Sorted, duplicate-free union of day keys across a comparison group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<NaiveDate>);

impl LabelSet {
    pub fn union<'a>(series: impl IntoIterator<Item = &'a Series>) -> Self {
        let days: BTreeSet<NaiveDate> = series
            .into_iter()
            .flat_map(|s| s.samples.iter().map(|p| p.day))
            .collect();
        Self(days.into_iter().collect())
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub station_id: String,
    /// One slot per label; `None` marks a day without a sample.
    pub values: Vec<Option<f64>>,
}

impl AlignedSeries {
    /// No interpolation: days without a sample stay missing.
    pub fn align(series: &Series, labels: &LabelSet) -> Self {
        let values = labels.days().iter().map(|day| series.value_on(*day)).collect();
        Self {
            station_id: series.station_id.clone(),
            values,
        }
    }
}

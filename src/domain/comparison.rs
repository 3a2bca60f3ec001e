// Comparison domain model: chart axis plus ranked table for a station group
use super::identity::{SeriesIdentity, SeriesIdentityCache};
use super::ranking::{rank_rows, RankedRow, SortOrder};
use super::sample::RawSample;
use super::series::{AlignedSeries, LabelSet, Series};
use super::snapshot::PriceSnapshot;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonGroup {
    pub id: String,
    pub title: String,
    pub stations: Vec<String>,
    /// Fallback logos by station position.
    pub logos: Vec<String>,
}

impl ComparisonGroup {
    pub fn new(
        id: String,
        title: Option<String>,
        fuel: Option<String>,
        stations: Vec<String>,
        logos: Vec<String>,
    ) -> Self {
        let title = title.unwrap_or_else(|| Self::default_title(fuel.as_deref()));
        Self {
            id,
            title,
            stations,
            logos,
        }
    }

    fn default_title(fuel: Option<&str>) -> String {
        match fuel {
            Some(fuel) if !fuel.is_empty() => format!("Comparison: {}", fuel),
            _ => "Comparison".to_string(),
        }
    }

    pub fn fallback_logo(&self, position: usize) -> Option<String> {
        self.logos.get(position).filter(|l| !l.is_empty()).cloned()
    }
}

/// Common axis and per-station aligned values, in station order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartView {
    pub labels: LabelSet,
    pub series: Vec<AlignedSeries>,
    pub dropped_samples: usize,
}

impl ChartView {
    /// Stations absent from `histories` contribute an all-missing series.
    pub fn build(station_ids: &[String], histories: &HashMap<String, Vec<RawSample>>) -> Self {
        let normalized: Vec<Series> = station_ids
            .iter()
            .map(|id| match histories.get(id) {
                Some(raw) => Series::from_raw(id.clone(), raw),
                None => Series::empty(id.clone()),
            })
            .collect();

        let labels = LabelSet::union(&normalized);
        let series = normalized
            .iter()
            .map(|s| AlignedSeries::align(s, &labels))
            .collect();
        let dropped_samples = normalized.iter().map(|s| s.dropped).sum();

        Self {
            labels,
            series,
            dropped_samples,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    #[serde(flatten)]
    pub identity: SeriesIdentity,
    #[serde(flatten)]
    pub aligned: AlignedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub id: String,
    pub title: String,
    pub labels: LabelSet,
    pub series: Vec<ChartSeries>,
    pub rows: Vec<RankedRow>,
    pub order: SortOrder,
    pub dropped_samples: usize,
}

impl Comparison {
    pub fn build(
        group: &ComparisonGroup,
        histories: &HashMap<String, Vec<RawSample>>,
        snapshots: &[PriceSnapshot],
        order: SortOrder,
        epsilon: f64,
        identities: &mut SeriesIdentityCache,
    ) -> Self {
        let chart = ChartView::build(&group.stations, histories);

        let names: HashMap<&str, &str> = snapshots
            .iter()
            .map(|s| (s.station_id.as_str(), s.name()))
            .collect();

        // Chart series keep station order; only the table is ranked
        let series = chart
            .series
            .into_iter()
            .map(|aligned| ChartSeries {
                label: names
                    .get(aligned.station_id.as_str())
                    .map_or_else(|| aligned.station_id.clone(), |n| n.to_string()),
                identity: identities.resolve(&aligned.station_id),
                aligned,
            })
            .collect();

        Self {
            id: group.id.clone(),
            title: group.title.clone(),
            labels: chart.labels,
            series,
            rows: rank_rows(snapshots, order, epsilon),
            order,
            dropped_samples: chart.dropped_samples,
        }
    }
}

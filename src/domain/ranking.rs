// Table ordering and best-price detection
use super::snapshot::PriceSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

pub const DEFAULT_BEST_PRICE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Price,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    #[serde(default)]
    pub key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    fn compare(&self, a: &PriceSnapshot, b: &PriceSnapshot) -> Ordering {
        let directed = |ord: Ordering| match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };

        match self.key {
            SortKey::Name => directed(a.name().cmp(b.name())),
            // Unavailable prices go last whichever way the table is sorted
            SortKey::Price => match (a.price.value(), b.price.value()) {
                (Some(x), Some(y)) => directed(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    #[serde(flatten)]
    pub snapshot: PriceSnapshot,
    pub is_best: bool,
}

/// Stable sort: rows with equal keys keep their input order.
pub fn rank(snapshots: &[PriceSnapshot], order: SortOrder) -> Vec<PriceSnapshot> {
    let mut ranked = snapshots.to_vec();
    ranked.sort_by(|a, b| order.compare(a, b));
    ranked
}

/// Ids of every station within `epsilon` of the lowest valid price.
pub fn best_price_ids(snapshots: &[PriceSnapshot], epsilon: f64) -> HashSet<String> {
    let Some(min) = snapshots
        .iter()
        .filter_map(|s| s.price.value())
        .min_by(|a, b| a.total_cmp(b))
    else {
        return HashSet::new();
    };

    snapshots
        .iter()
        .filter(|s| s.price.value().is_some_and(|p| p - min <= epsilon))
        .map(|s| s.station_id.clone())
        .collect()
}

pub fn rank_rows(snapshots: &[PriceSnapshot], order: SortOrder, epsilon: f64) -> Vec<RankedRow> {
    let best = best_price_ids(snapshots, epsilon);
    rank(snapshots, order)
        .into_iter()
        .map(|snapshot| {
            let is_best = best.contains(&snapshot.station_id);
            RankedRow { snapshot, is_best }
        })
        .collect()
}

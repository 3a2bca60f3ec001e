// Comparison service - Use case for building a station comparison
use crate::application::price_repository::{history_window, PriceRepository};
use crate::domain::comparison::{Comparison, ComparisonGroup};
use crate::domain::identity::SeriesIdentityCache;
use crate::domain::ranking::SortOrder;
use crate::domain::snapshot::{Price, PriceSnapshot};
use crate::infrastructure::config::HistoryConfig;
use futures::future::join_all;
use std::sync::{Arc, Mutex};

struct GroupEntry {
    group: ComparisonGroup,
    identities: Mutex<SeriesIdentityCache>,
}

#[derive(Clone)]
pub struct ComparisonService {
    repository: Arc<dyn PriceRepository>,
    groups: Arc<Vec<GroupEntry>>,
    history_config: HistoryConfig,
}

impl ComparisonService {
    pub fn new(
        repository: Arc<dyn PriceRepository>,
        groups: Vec<ComparisonGroup>,
        history_config: HistoryConfig,
    ) -> Self {
        let groups = groups
            .into_iter()
            .map(|group| GroupEntry {
                group,
                identities: Mutex::new(SeriesIdentityCache::new(history_config.palette.clone())),
            })
            .collect();

        Self {
            repository,
            groups: Arc::new(groups),
            history_config,
        }
    }

    pub fn list_groups(&self) -> Vec<ComparisonGroup> {
        self.groups.iter().map(|e| e.group.clone()).collect()
    }

    pub fn default_order(&self) -> SortOrder {
        self.history_config.default_order
    }

    /// `None` when no group has this id.
    pub async fn get_comparison(
        &self,
        group_id: &str,
        order: SortOrder,
    ) -> anyhow::Result<Option<Comparison>> {
        let Some(entry) = self.groups.iter().find(|e| e.group.id == group_id) else {
            return Ok(None);
        };
        let group = &entry.group;

        let (start, end) = history_window(self.history_config.days)?;

        let (histories, snapshots) = tokio::join!(
            self.repository.fetch_history(&group.stations, start, end),
            load_snapshots(self.repository.as_ref(), group),
        );

        // A failed history fetch still yields a table, just with an empty chart
        let histories = histories.unwrap_or_else(|e| {
            tracing::warn!("Error fetching history for group {}: {:#}", group.id, e);
            Default::default()
        });

        let comparison = {
            let mut identities = entry
                .identities
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Comparison::build(
                group,
                &histories,
                &snapshots,
                order,
                self.history_config.best_price_epsilon,
                &mut identities,
            )
        };

        tracing::debug!(
            "Built comparison {}: {} labels, {} rows, {} dropped samples",
            group.id,
            comparison.labels.len(),
            comparison.rows.len(),
            comparison.dropped_samples
        );

        Ok(Some(comparison))
    }
}

/// Snapshot for every station of a group, in station order.
async fn load_snapshots(
    repository: &dyn PriceRepository,
    group: &ComparisonGroup,
) -> Vec<PriceSnapshot> {
    let futures = group
        .stations
        .iter()
        .enumerate()
        .map(|(i, station_id)| load_snapshot(repository, station_id, group.fallback_logo(i)));
    join_all(futures).await
}

/// Unknown stations and fetch errors both degrade to an unavailable price.
pub(crate) async fn load_snapshot(
    repository: &dyn PriceRepository,
    station_id: &str,
    fallback_logo: Option<String>,
) -> PriceSnapshot {
    match repository.fetch_state(station_id).await {
        Ok(Some(state)) => PriceSnapshot::new(
            station_id.to_string(),
            state.display_name,
            Price::from_state(&state.value),
            state.logo.or(fallback_logo),
        ),
        Ok(None) => {
            tracing::debug!("Station {} is unknown to the state source", station_id);
            PriceSnapshot {
                logo: fallback_logo,
                ..PriceSnapshot::unavailable(station_id)
            }
        }
        Err(e) => {
            tracing::warn!("Error fetching state for {}: {:#}", station_id, e);
            PriceSnapshot {
                logo: fallback_logo,
                ..PriceSnapshot::unavailable(station_id)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::price_repository::StationState;
    use crate::domain::ranking::{SortDirection, SortKey};
    use crate::domain::sample::RawSample;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;

    /// In-memory repository; `fail_history` simulates a total fetch failure.
    #[derive(Default)]
    pub(crate) struct FakeRepository {
        pub histories: HashMap<String, Vec<RawSample>>,
        pub states: HashMap<String, StationState>,
        pub fail_history: bool,
        pub fail_states: bool,
    }

    #[async_trait]
    impl PriceRepository for FakeRepository {
        async fn fetch_history(
            &self,
            station_ids: &[String],
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<HashMap<String, Vec<RawSample>>> {
            if self.fail_history {
                anyhow::bail!("history unavailable");
            }
            Ok(self
                .histories
                .iter()
                .filter(|(id, _)| station_ids.contains(*id))
                .map(|(id, samples)| (id.clone(), samples.clone()))
                .collect())
        }

        async fn fetch_state(&self, station_id: &str) -> anyhow::Result<Option<StationState>> {
            if self.fail_states {
                anyhow::bail!("states unavailable");
            }
            Ok(self.states.get(station_id).cloned())
        }
    }

    pub(crate) fn state(value: &str, name: &str) -> StationState {
        StationState {
            value: value.to_string(),
            display_name: Some(name.to_string()),
            logo: None,
        }
    }

    fn repository() -> FakeRepository {
        FakeRepository {
            histories: HashMap::from([
                (
                    "sensor.eni".to_string(),
                    vec![
                        RawSample::new("2024-01-01T07:00:00Z", "1.899"),
                        RawSample::new("2024-01-03T07:00:00Z", "1.850"),
                    ],
                ),
                (
                    "sensor.q8".to_string(),
                    vec![RawSample::new("2024-01-02T07:00:00Z", "1.999")],
                ),
            ]),
            states: HashMap::from([
                ("sensor.eni".to_string(), state("1.850", "Eni")),
                ("sensor.q8".to_string(), state("1.850", "Q8")),
                ("sensor.ip".to_string(), state("unknown", "IP")),
            ]),
            ..Default::default()
        }
    }

    fn service(repository: FakeRepository) -> ComparisonService {
        let group = ComparisonGroup::new(
            "diesel".to_string(),
            Some("Diesel nearby".to_string()),
            None,
            vec![
                "sensor.eni".to_string(),
                "sensor.q8".to_string(),
                "sensor.ip".to_string(),
                "sensor.gone".to_string(),
            ],
            vec![
                String::new(),
                String::new(),
                String::new(),
                "/local/default.png".to_string(),
            ],
        );
        ComparisonService::new(Arc::new(repository), vec![group], HistoryConfig::default())
    }

    #[tokio::test]
    async fn test_get_comparison() {
        let service = service(repository());
        let comparison = service
            .get_comparison("diesel", SortOrder::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(comparison.title, "Diesel nearby");
        assert_eq!(comparison.labels.len(), 3);
        assert_eq!(comparison.series.len(), 4);
        assert_eq!(comparison.series[0].aligned.values, vec![Some(1.899), None, Some(1.850)]);
        assert_eq!(comparison.series[3].aligned.values, vec![None, None, None]);

        let rows: Vec<(&str, bool)> = comparison
            .rows
            .iter()
            .map(|r| (r.snapshot.name(), r.is_best))
            .collect();
        assert_eq!(
            rows,
            vec![("Eni", true), ("Q8", true), ("IP", false), ("sensor.gone", false)]
        );
        assert_eq!(comparison.rows[3].snapshot.logo.as_deref(), Some("/local/default.png"));
    }

    #[tokio::test]
    async fn test_ranking_does_not_move_chart_series() {
        let service = service(repository());
        let order = SortOrder::new(SortKey::Name, SortDirection::Descending);
        let first = service.get_comparison("diesel", order).await.unwrap().unwrap();
        let second = service
            .get_comparison("diesel", SortOrder::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.rows[0].snapshot.name(), "sensor.gone");
        assert_eq!(first.series, second.series);
    }

    #[tokio::test]
    async fn test_unknown_group() {
        let service = service(repository());
        assert!(service
            .get_comparison("petrol", SortOrder::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_total_fetch_failure_yields_empty_structures() {
        let service = service(FakeRepository {
            fail_history: true,
            fail_states: true,
            ..Default::default()
        });
        let comparison = service
            .get_comparison("diesel", SortOrder::default())
            .await
            .unwrap()
            .unwrap();

        assert!(comparison.labels.is_empty());
        assert!(comparison.series.iter().all(|s| s.aligned.values.is_empty()));
        assert_eq!(comparison.rows.len(), 4);
        assert!(comparison.rows.iter().all(|r| !r.is_best && r.snapshot.price == Price::Unavailable));
    }
}

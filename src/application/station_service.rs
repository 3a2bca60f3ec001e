// Station service - Use case for a single station card
use crate::application::price_repository::{history_window, PriceRepository};
use crate::domain::comparison::ChartView;
use crate::domain::series::LabelSet;
use crate::domain::snapshot::{Price, PriceSnapshot};
use crate::infrastructure::config::HistoryConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    #[serde(flatten)]
    pub snapshot: PriceSnapshot,
    pub labels: LabelSet,
    pub values: Vec<Option<f64>>,
    pub dropped_samples: usize,
}

#[derive(Clone)]
pub struct StationService {
    repository: Arc<dyn PriceRepository>,
    /// Only stations from the configured groups are exposed.
    stations: Arc<HashSet<String>>,
    history_config: HistoryConfig,
}

impl StationService {
    pub fn new(
        repository: Arc<dyn PriceRepository>,
        stations: HashSet<String>,
        history_config: HistoryConfig,
    ) -> Self {
        Self {
            repository,
            stations: Arc::new(stations),
            history_config,
        }
    }

    /// `None` when the station is not configured or the state source does
    /// not know it.
    pub async fn get_station(
        &self,
        station_id: &str,
        days: Option<i64>,
    ) -> anyhow::Result<Option<StationView>> {
        if !self.stations.contains(station_id) {
            tracing::debug!("Refusing unconfigured station {}", station_id);
            return Ok(None);
        }
        let Some(state) = self.repository.fetch_state(station_id).await? else {
            return Ok(None);
        };
        let snapshot = PriceSnapshot::new(
            station_id.to_string(),
            state.display_name,
            Price::from_state(&state.value),
            state.logo,
        );

        let (start, end) = history_window(days.unwrap_or(self.history_config.days))?;

        let station_ids = [station_id.to_string()];
        let histories = self
            .repository
            .fetch_history(&station_ids, start, end)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Error fetching history for {}: {:#}", station_id, e);
                Default::default()
            });

        let ChartView {
            labels,
            mut series,
            dropped_samples,
        } = ChartView::build(&station_ids, &histories);
        let values = series.pop().map(|s| s.values).unwrap_or_default();

        Ok(Some(StationView {
            snapshot,
            labels,
            values,
            dropped_samples,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::comparison_service::tests::{state, FakeRepository};
    use crate::domain::sample::RawSample;
    use std::collections::HashMap;

    fn service(repository: FakeRepository) -> StationService {
        let stations = HashSet::from(["sensor.eni".to_string(), "sensor.nowhere".to_string()]);
        StationService::new(Arc::new(repository), stations, HistoryConfig::default())
    }

    #[tokio::test]
    async fn test_get_station() {
        let repository = FakeRepository {
            histories: HashMap::from([(
                "sensor.eni".to_string(),
                vec![
                    RawSample::new("2024-01-01T07:00:00Z", "1.899"),
                    RawSample::new("2024-01-01T19:00:00Z", "1.889"),
                    RawSample::new("2024-01-02T07:00:00Z", "unavailable"),
                    RawSample::new("2024-01-03T07:00:00Z", "1.850"),
                ],
            )]),
            states: HashMap::from([("sensor.eni".to_string(), state("1.850", "Eni"))]),
            ..Default::default()
        };

        let view = service(repository)
            .get_station("sensor.eni", Some(14))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.snapshot.price, Price::Available(1.850));
        assert_eq!(view.labels.len(), 2);
        assert_eq!(view.values, vec![Some(1.889), Some(1.850)]);
        assert_eq!(view.dropped_samples, 1);
    }

    #[tokio::test]
    async fn test_unknown_station() {
        let view = service(FakeRepository::default())
            .get_station("sensor.nowhere", None)
            .await
            .unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_station_is_hidden() {
        let repository = FakeRepository {
            states: HashMap::from([("person.owner".to_string(), state("home", "Owner"))]),
            ..Default::default()
        };
        let view = service(repository)
            .get_station("person.owner", None)
            .await
            .unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_an_error() {
        let repository = FakeRepository {
            states: HashMap::from([("sensor.eni".to_string(), state("1.850", "Eni"))]),
            ..Default::default()
        };
        let result = service(repository)
            .get_station("sensor.eni", Some(1_000_000_000))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_history_failure_keeps_snapshot() {
        let repository = FakeRepository {
            states: HashMap::from([("sensor.eni".to_string(), state("unknown", "Eni"))]),
            fail_history: true,
            ..Default::default()
        };
        let view = service(repository)
            .get_station("sensor.eni", None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.snapshot.price, Price::Unavailable);
        assert!(view.labels.is_empty());
        assert!(view.values.is_empty());
    }
}

// Repository trait for price history and current station state
use crate::domain::sample::RawSample;
use async_trait::async_trait;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Current state of a station as reported by the state source
#[derive(Debug, Clone, PartialEq)]
pub struct StationState {
    pub value: String,
    pub display_name: Option<String>,
    pub logo: Option<String>,
}

#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Raw history per station id over `[start, end]`. Stations without
    /// history may be absent from the map.
    async fn fetch_history(
        &self,
        station_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<String, Vec<RawSample>>>;

    /// Current state, or `None` when the station is unknown
    async fn fetch_state(&self, station_id: &str) -> anyhow::Result<Option<StationState>>;
}

/// `[now - days, now]`, failing instead of overflowing on absurd windows.
pub fn history_window(days: i64) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end = Utc::now();
    let start = Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .with_context(|| format!("History window of {} days is out of range", days))?;
    Ok((start, end))
}

// Home Assistant REST repository implementation
use crate::application::price_repository::{PriceRepository, StationState};
use crate::domain::sample::RawSample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HomeAssistantRepository {
    host: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    entity_id: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    last_changed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StateResponse {
    state: String,
    #[serde(default)]
    attributes: StateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct StateAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    brand_logo: Option<String>,
}

impl HomeAssistantRepository {
    pub fn new(host: String, token: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn build_history_url(
        &self,
        station_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> String {
        let start = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            "{}/api/history/period/{}?filter_entity_id={}&end_time={}&no_attributes",
            self.host,
            urlencoding::encode(&start),
            urlencoding::encode(&station_ids.join(",")),
            urlencoding::encode(&end),
        )
    }

    fn build_state_url(&self, station_id: &str) -> String {
        format!("{}/api/states/{}", self.host, urlencoding::encode(station_id))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to Home Assistant")
    }

    /// Group history lists by entity id. Only the first record of a list is
    /// guaranteed to carry it. Records with a null or missing state or
    /// timestamp become empty samples, which the parser drops and counts.
    fn group_history(lists: Vec<Vec<HistoryRecord>>) -> HashMap<String, Vec<RawSample>> {
        let mut histories = HashMap::new();
        for list in lists {
            let Some(entity_id) = list.first().and_then(|r| r.entity_id.clone()) else {
                tracing::warn!("Skipping history list without entity_id ({} records)", list.len());
                continue;
            };
            let samples = list
                .into_iter()
                .map(|r| {
                    RawSample::new(r.last_changed.unwrap_or_default(), r.state.unwrap_or_default())
                })
                .collect();
            histories.insert(entity_id, samples);
        }
        histories
    }
}

#[async_trait]
impl PriceRepository for HomeAssistantRepository {
    async fn fetch_history(
        &self,
        station_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HashMap<String, Vec<RawSample>>> {
        if station_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.build_history_url(station_ids, start, end);
        tracing::debug!("Fetching history: {}", url);

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Home Assistant history request failed with status {}: {}", status, body);
        }

        let lists = response
            .json::<Vec<Vec<HistoryRecord>>>()
            .await
            .context("Failed to parse Home Assistant history response")?;

        let histories = Self::group_history(lists);
        tracing::debug!(
            "Got history for {} of {} stations",
            histories.len(),
            station_ids.len()
        );
        Ok(histories)
    }

    async fn fetch_state(&self, station_id: &str) -> Result<Option<StationState>> {
        let response = self.get(&self.build_state_url(station_id)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Home Assistant state request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<StateResponse>()
            .await
            .context("Failed to parse Home Assistant state response")?;

        let StateAttributes {
            name,
            friendly_name,
            brand_logo,
        } = data.attributes;

        Ok(Some(StationState {
            value: data.state,
            display_name: name.or(friendly_name),
            logo: brand_logo.filter(|l| !l.is_empty()),
        }))
    }
}

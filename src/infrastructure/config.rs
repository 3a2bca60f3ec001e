use crate::domain::comparison::ComparisonGroup;
use crate::domain::identity::DEFAULT_PALETTE;
use crate::domain::ranking::{SortOrder, DEFAULT_BEST_PRICE_EPSILON};
use serde::Deserialize;
use std::collections::HashSet;

const DEFAULT_HISTORY_DAYS: i64 = 14;
/// Upper bound for any history window, configured or requested.
pub const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub home_assistant: HomeAssistantSettings,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistantSettings {
    pub host: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_days")]
    pub days: i64,
    #[serde(default = "default_epsilon")]
    pub best_price_epsilon: f64,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub default_order: SortOrder,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: default_history_days(),
            best_price_epsilon: default_epsilon(),
            palette: default_palette(),
            default_order: SortOrder::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    pub id: String,
    pub title: Option<String>,
    pub fuel: Option<String>,
    pub stations: Vec<String>,
    #[serde(default)]
    pub logos: Vec<String>,
}

impl GroupConfig {
    pub fn to_group(&self) -> ComparisonGroup {
        ComparisonGroup::new(
            self.id.clone(),
            self.title.clone(),
            self.fuel.clone(),
            self.stations.clone(),
            self.logos.clone(),
        )
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("comparison group '{group}' needs at least two stations, got {count}")]
    TooFewStations { group: String, count: usize },
    #[error("comparison group '{group}' lists station '{station}' more than once")]
    DuplicateStation { group: String, station: String },
    #[error("comparison group '{0}' is defined more than once")]
    DuplicateGroup(String),
    #[error("history window must be between 1 and {} days, got {}", MAX_HISTORY_DAYS, .0)]
    InvalidHistoryDays(i64),
    #[error("best price epsilon must be a non-negative number, got {0}")]
    InvalidEpsilon(f64),
    #[error("color palette must not be empty")]
    EmptyPalette,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(1..=MAX_HISTORY_DAYS).contains(&self.history.days) {
            return Err(ConfigValidationError::InvalidHistoryDays(self.history.days));
        }
        let epsilon = self.history.best_price_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigValidationError::InvalidEpsilon(epsilon));
        }
        if self.history.palette.is_empty() {
            return Err(ConfigValidationError::EmptyPalette);
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.stations.len() < 2 {
                return Err(ConfigValidationError::TooFewStations {
                    group: group.id.clone(),
                    count: group.stations.len(),
                });
            }
            if !seen.insert(group.id.as_str()) {
                return Err(ConfigValidationError::DuplicateGroup(group.id.clone()));
            }
            let mut stations = HashSet::new();
            if let Some(station) = group.stations.iter().find(|s| !stations.insert(s.as_str())) {
                return Err(ConfigValidationError::DuplicateStation {
                    group: group.id.clone(),
                    station: station.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn comparison_groups(&self) -> Vec<ComparisonGroup> {
        self.groups.iter().map(GroupConfig::to_group).collect()
    }

    /// Every station id that appears in some comparison group.
    pub fn configured_stations(&self) -> HashSet<String> {
        self.groups
            .iter()
            .flat_map(|g| g.stations.iter().cloned())
            .collect()
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_history_days() -> i64 {
    DEFAULT_HISTORY_DAYS
}

fn default_epsilon() -> f64 {
    DEFAULT_BEST_PRICE_EPSILON
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Load `config/app.*` (optional) overlaid with `FUEL__SECTION__KEY` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("FUEL").separator("__"))
        .build()?;

    finish(settings)
}

fn finish(settings: config::Config) -> anyhow::Result<AppConfig> {
    let app: AppConfig = settings.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

// HTTP request handlers
use crate::application::station_service::StationView;
use crate::domain::comparison::{Comparison, ComparisonGroup};
use crate::domain::ranking::{SortDirection, SortKey, SortOrder};
use crate::infrastructure::config::MAX_HISTORY_DAYS;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<SortKey>,
    pub dir: Option<SortDirection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub days: Option<i64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List configured comparison groups
pub async fn list_comparisons(State(state): State<Arc<AppState>>) -> Json<Vec<ComparisonGroup>> {
    Json(state.comparison_service.list_groups())
}

/// Chart axis, aligned series and ranked table for one group
pub async fn get_comparison(
    Path(id): Path<String>,
    Query(query): Query<SortQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Comparison>, ApiError> {
    let defaults = state.comparison_service.default_order();
    let order = SortOrder::new(
        query.sort.unwrap_or(defaults.key),
        query.dir.unwrap_or(defaults.direction),
    );

    state
        .comparison_service
        .get_comparison(&id, order)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("comparison group '{}'", id)))
}

/// Single station price and history
pub async fn get_station(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StationView>, ApiError> {
    if let Some(days) = query.days.filter(|d| !(1..=MAX_HISTORY_DAYS).contains(d)) {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {}, got {}",
            MAX_HISTORY_DAYS, days
        )));
    }

    state
        .station_service
        .get_station(&id, query.days)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("station '{}'", id)))
}

// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::comparison_service::ComparisonService;
use crate::application::station_service::StationService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::home_assistant_repository::HomeAssistantRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_comparison, get_station, health_check, list_comparisons};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HomeAssistantRepository::new(
        app_config.home_assistant.host.clone(),
        app_config.home_assistant.token.clone(),
    ));

    // Create services (application layer)
    let comparison_service = ComparisonService::new(
        repository.clone(),
        app_config.comparison_groups(),
        app_config.history.clone(),
    );
    let station_service = StationService::new(
        repository,
        app_config.configured_stations(),
        app_config.history.clone(),
    );

    let state = Arc::new(AppState {
        comparison_service,
        station_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/comparisons", get(list_comparisons))
        .route("/comparisons/:id", get(get_comparison))
        .route("/stations/:id", get(get_station))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind))?;
    tracing::info!(
        "Starting fuel-price-compare on {} with {} comparison groups",
        addr,
        app_config.groups.len()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

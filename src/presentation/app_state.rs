// Application state for HTTP handlers
use crate::application::comparison_service::ComparisonService;
use crate::application::station_service::StationService;

#[derive(Clone)]
pub struct AppState {
    pub comparison_service: ComparisonService,
    pub station_service: StationService,
}

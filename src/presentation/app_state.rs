// Application state for HTTP handlers
use crate::application::city_service::CityService;
use crate::application::dashboard_service::DashboardService;
use crate::application::live_service::LiveService;
use crate::application::state_actor::StateHandle;

#[derive(Clone)]
pub struct AppState {
    pub city_service: CityService,
    pub dashboard_service: DashboardService,
    pub live_service: LiveService,
    pub state: StateHandle,
}

// Route table for the dashboard API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    advance_recommendation, archive_alert, city_summary, dismiss_alert, generate_recommendation, get_alert, get_benchmark,
    get_dashboard, get_distribution, get_forecast, get_heatmap, get_savings, health_check, list_alerts, list_cities,
    list_devices, list_recommendations, live_feed, mark_alert_read, toggle_device,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Responses are compressed by the handlers, so no CompressionLayer here.
    Router::new()
        .route("/healthz", get(health_check))
        .route("/cities", get(list_cities))
        .route("/cities/:city", get(city_summary))
        .route("/dashboards/:city", get(get_dashboard))
        .route("/distribution/:city", get(get_distribution))
        .route("/heatmap", get(get_heatmap))
        .route("/forecast/:city", get(get_forecast))
        .route("/savings/:city", get(get_savings))
        .route("/benchmark/:city", get(get_benchmark))
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id", get(get_alert).delete(dismiss_alert))
        .route("/alerts/:id/read", post(mark_alert_read))
        .route("/alerts/:id/archive", post(archive_alert))
        .route("/recommendations", get(list_recommendations).post(generate_recommendation))
        .route("/recommendations/:id/advance", post(advance_recommendation))
        .route("/devices", get(list_devices))
        .route("/devices/:id/toggle", post(toggle_device))
        .route("/live", get(live_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

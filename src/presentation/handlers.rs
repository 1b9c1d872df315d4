// HTTP request handlers
use crate::application::dashboard_service::DashboardRequest;
use crate::application::registry::{AlertQuery, AlertView, RecommendationQuery};
use crate::application::savings::SavingsMode;
use crate::domain::alert::AlertCategory;
use crate::domain::city::CitySelection;
use crate::domain::error::DashboardError;
use crate::domain::heatmap::HeatmapMode;
use crate::domain::recommendation::{RecommendationCategory, RecommendationStatus};
use crate::domain::record::RecordId;
use crate::domain::series::{Metric, TimeUnit, TimeWindow};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Wraps a domain error so it renders as a JSON error body.
pub struct ApiError(pub DashboardError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DashboardError::NotFound(_) | DashboardError::UnknownDevice(_) => StatusCode::NOT_FOUND,
            DashboardError::UnknownCity(_)
            | DashboardError::UnknownCategory(_)
            | DashboardError::UnknownMetric(_)
            | DashboardError::InvalidWindow(_)
            | DashboardError::InvalidShape(_) => StatusCode::BAD_REQUEST,
            DashboardError::InvalidTransition { .. } => StatusCode::CONFLICT,
            DashboardError::ShapeMismatch { .. } | DashboardError::EmptyDistribution => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DashboardError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Rejected request: {}", self.0);
        }
        let body = serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub metric: Option<String>,
    pub unit: Option<String>,
    pub count: Option<usize>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub start_hour: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SavingsQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BenchmarkQuery {
    pub unit: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub view: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Check if client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

/// Empty and absent filters both mean "no filter".
fn parse_filter<T: FromStr<Err = DashboardError>>(value: Option<&str>) -> Result<Option<T>, DashboardError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(T::from_str)
        .transpose()
}

async fn respond<T: Serialize>(result: Result<T, DashboardError>, headers: &HeaderMap) -> Response {
    match result {
        Ok(data) => match json_response(&data, accepts_brotli(headers)).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => ApiError(e).into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_cities(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(state.city_service.list_cities().await, &headers).await
}

pub async fn city_summary(
    Path(city): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let selection = CitySelection::parse(&city)?;
        state.city_service.summary(&selection).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_dashboard(
    Path(city): Path<String>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let city = CitySelection::parse(&city)?;
        let metric = parse_filter::<Metric>(query.metric.as_deref())?.unwrap_or(Metric::Consumption);
        let unit = parse_filter::<TimeUnit>(query.unit.as_deref())?.unwrap_or(TimeUnit::Hour);
        let count = query.count.unwrap_or(unit.natural_period() as usize);
        let category = query
            .category
            .filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case("all"));

        let request = DashboardRequest {
            city,
            metric,
            window: TimeWindow::new(unit, count),
            category,
        };
        state.dashboard_service.get_dashboard(&request).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_distribution(
    Path(city): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let selection = CitySelection::parse(&city)?;
        state.dashboard_service.distribution(&selection).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_heatmap(
    Query(query): Query<HeatmapQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let mode = parse_filter::<HeatmapMode>(query.mode.as_deref())?.unwrap_or(HeatmapMode::Daily);
        state.dashboard_service.heatmap(mode).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_forecast(
    Path(city): Path<String>,
    Query(query): Query<ForecastQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = CitySelection::parse(&city).map(|selection| {
        let start_hour = query.start_hour.unwrap_or_else(|| Utc::now().hour());
        state.dashboard_service.forecast(&selection, start_hour)
    });
    respond(result, &headers).await
}

pub async fn get_savings(
    Path(city): Path<String>,
    Query(query): Query<SavingsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let selection = CitySelection::parse(&city)?;
        let mode = parse_filter::<SavingsMode>(query.mode.as_deref())?.unwrap_or(SavingsMode::Monthly);
        state.dashboard_service.savings(&selection, mode).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_benchmark(
    Path(city): Path<String>,
    Query(query): Query<BenchmarkQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let selection = CitySelection::parse(&city)?;
        let unit = parse_filter::<TimeUnit>(query.unit.as_deref())?.unwrap_or(TimeUnit::Month);
        let count = query.count.unwrap_or(unit.natural_period() as usize);
        state
            .dashboard_service
            .benchmark(&selection, TimeWindow::new(unit, count))
            .await
    }
    .await;
    respond(result, &headers).await
}

pub async fn list_alerts(
    Query(query): Query<AlertsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let alert_query = AlertQuery {
            view: parse_filter::<AlertView>(query.view.as_deref())?.unwrap_or_default(),
            category: parse_filter::<AlertCategory>(query.category.as_deref())?,
            city: parse_filter::<CitySelection>(query.city.as_deref())?.unwrap_or_default(),
            search: query.search,
        };
        state.state.alerts(alert_query).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn get_alert(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.alert(RecordId(id)).await, &headers).await
}

pub async fn mark_alert_read(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.mark_read(RecordId(id)).await, &headers).await
}

pub async fn archive_alert(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.archive(RecordId(id)).await, &headers).await
}

pub async fn dismiss_alert(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.dismiss(RecordId(id)).await, &headers).await
}

pub async fn list_recommendations(
    Query(query): Query<RecommendationsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = async {
        let recommendation_query = RecommendationQuery {
            status: parse_filter::<RecommendationStatus>(query.status.as_deref())?,
            category: parse_filter::<RecommendationCategory>(query.category.as_deref())?,
        };
        state.state.recommendations(recommendation_query).await
    }
    .await;
    respond(result, &headers).await
}

pub async fn generate_recommendation(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(state.state.generate_recommendation().await, &headers).await
}

pub async fn advance_recommendation(
    Path(id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.advance_recommendation(RecordId(id)).await, &headers).await
}

pub async fn list_devices(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(state.state.devices().await, &headers).await
}

pub async fn toggle_device(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(state.state.toggle_device(&id).await, &headers).await
}

/// Stream live snapshots, one frame per refresh tick
pub async fn live_feed(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.live_service.open_feed().await {
        Ok(feed) => stream_from_receiver(feed.receiver, feed.subscription, accepts_brotli(&headers)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

// Repository trait for telemetry data access
use crate::application::savings::{CostRow, SavingsMode};
use crate::domain::city::City;
use crate::domain::distribution::DistributionEntry;
use crate::domain::error::DashboardError;
use crate::domain::heatmap::HeatmapMode;
use crate::domain::series::{Metric, SeriesPoint, TimeWindow};
use async_trait::async_trait;

/// One labelled row of a heatmap profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Source of raw readings keyed by city, metric and time bucket. The synthetic
/// generator implements it today; a real ingestion adapter would implement the
/// same contract.
#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Cities in the allow-list, in display order
    async fn list_cities(&self) -> Result<Vec<City>, DashboardError>;

    /// One city's series for a metric over a window
    async fn city_series(
        &self,
        city_id: &str,
        metric: Metric,
        window: TimeWindow,
    ) -> Result<Vec<SeriesPoint>, DashboardError>;

    /// Consumption per equipment category for one city
    async fn equipment_breakdown(&self, city_id: &str) -> Result<Vec<DistributionEntry>, DashboardError>;

    /// Fixed consumption profile backing the heatmap
    async fn heatmap_profile(&self, mode: HeatmapMode) -> Result<Vec<ProfileRow>, DashboardError>;

    /// Site-wide billed and projected cost per period
    async fn cost_history(&self, mode: SavingsMode) -> Result<Vec<CostRow>, DashboardError>;
}

// Synthetic telemetry repository backed by the deterministic generator
use crate::application::savings::{CostRow, SavingsMode};
use crate::application::series_generator::generate;
use crate::application::telemetry_repository::{ProfileRow, TelemetryRepository};
use crate::domain::city::{City, CITY_IDS};
use crate::domain::distribution::DistributionEntry;
use crate::domain::error::DashboardError;
use crate::domain::heatmap::HeatmapMode;
use crate::domain::series::{Metric, SeriesPoint, SeriesShape, TimeWindow};
use crate::infrastructure::catalog;
use crate::infrastructure::config::{TariffSettings, WidgetsConfig};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SyntheticRepository {
    widgets: WidgetsConfig,
    tariffs: TariffSettings,
    seed: u64,
}

impl SyntheticRepository {
    pub fn new(widgets: WidgetsConfig, tariffs: TariffSettings, seed: u64) -> Self {
        Self { widgets, tariffs, seed }
    }

    fn ensure_known(city_id: &str) -> Result<(), DashboardError> {
        if CITY_IDS.contains(&city_id) {
            Ok(())
        } else {
            Err(DashboardError::UnknownCity(city_id.to_string()))
        }
    }

    fn shape(&self, metric: Metric, window: &TimeWindow) -> Result<&SeriesShape, DashboardError> {
        self.widgets.shape_for(metric, window.unit).ok_or_else(|| {
            DashboardError::InvalidShape(format!("no shape configured for {metric} by {}", window.unit))
        })
    }

    /// Per-series seed: base seed mixed with an FNV-1a hash of the series key,
    /// so each city/metric/unit gets its own stable noise.
    fn series_seed(&self, city_id: &str, metric: Metric, window: &TimeWindow) -> u64 {
        let key = format!("{city_id}/{metric}/{}", window.unit);
        let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
        self.seed ^ hash
    }

    fn consumption(&self, city_id: &str, window: &TimeWindow) -> Result<Vec<SeriesPoint>, DashboardError> {
        let shape = self
            .shape(Metric::Consumption, window)?
            .scaled(self.widgets.city_scale(city_id));
        let seed = self.series_seed(city_id, Metric::Consumption, window);
        generate(window, &shape, Some(seed))
    }
}

fn scale_points(points: Vec<SeriesPoint>, factor: f64) -> Vec<SeriesPoint> {
    points
        .into_iter()
        .map(|p| SeriesPoint::new(p.label, p.value.map(|v| v * factor)))
        .collect()
}

#[async_trait]
impl TelemetryRepository for SyntheticRepository {
    async fn list_cities(&self) -> Result<Vec<City>, DashboardError> {
        Ok(catalog::cities())
    }

    async fn city_series(
        &self,
        city_id: &str,
        metric: Metric,
        window: TimeWindow,
    ) -> Result<Vec<SeriesPoint>, DashboardError> {
        Self::ensure_known(city_id)?;

        let points = match metric {
            Metric::Consumption => self.consumption(city_id, &window)?,
            Metric::Cost => scale_points(self.consumption(city_id, &window)?, self.tariffs.price_per_kwh),
            Metric::Co2 => scale_points(
                self.consumption(city_id, &window)?,
                self.tariffs.carbon_factor_kg_per_kwh,
            ),
            Metric::Efficiency => {
                let shape = self.shape(Metric::Efficiency, &window)?;
                generate(&window, shape, Some(self.series_seed(city_id, metric, &window)))?
            }
        };

        tracing::debug!("Generated {} {} points for {}", points.len(), metric, city_id);
        Ok(points)
    }

    async fn equipment_breakdown(&self, city_id: &str) -> Result<Vec<DistributionEntry>, DashboardError> {
        Self::ensure_known(city_id)?;
        let scale = self.widgets.city_scale(city_id);
        Ok(catalog::equipment()
            .into_iter()
            .map(|e| DistributionEntry::new(e.name, e.raw_value * scale))
            .collect())
    }

    async fn heatmap_profile(&self, mode: HeatmapMode) -> Result<Vec<ProfileRow>, DashboardError> {
        Ok(match mode {
            HeatmapMode::Daily => catalog::daily_profile(),
            HeatmapMode::Monthly => catalog::monthly_profile(),
        })
    }

    async fn cost_history(&self, mode: SavingsMode) -> Result<Vec<CostRow>, DashboardError> {
        Ok(catalog::cost_history(mode))
    }
}

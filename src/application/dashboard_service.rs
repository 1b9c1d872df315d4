// Dashboard service - Use case for building dashboard view-models
use crate::application::aggregator::{aggregate_view, downsample_points, CitySeries, CombineMode, SeriesStats, ViewFilter};
use crate::application::benchmark::{benchmark, Benchmark};
use crate::application::distribution::distribution;
use crate::application::forecast::{hourly_forecast, HourlyForecast};
use crate::application::heatmap::build_heatmap;
use crate::application::savings::{savings_report, SavingsMode, SavingsReport};
use crate::application::series_generator::{generate_partial, PartialSide};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::city::CitySelection;
use crate::domain::dashboard::Dashboard;
use crate::domain::distribution::{CategoryShare, ColorToken, DistributionEntry};
use crate::domain::error::DashboardError;
use crate::domain::heatmap::{Heatmap, HeatmapMode};
use crate::domain::series::{Metric, SeriesPoint, TimeWindow};
use crate::domain::telemetry::{ChartData, SeriesData, TileData};
use crate::infrastructure::config::{prepare_label, TariffSettings, WidgetsConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Prediction runs this far below the consumption baseline.
const PREDICTION_FACTOR: f64 = 0.9375;

#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub city: CitySelection,
    pub metric: Metric,
    pub window: TimeWindow,
    /// Restrict to one equipment category.
    pub category: Option<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn TelemetryRepository>,
    widgets_config: WidgetsConfig,
    tariffs: TariffSettings,
    seed: u64,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        widgets_config: WidgetsConfig,
        tariffs: TariffSettings,
        seed: u64,
    ) -> Self {
        Self {
            repository,
            widgets_config,
            tariffs,
            seed,
        }
    }

    pub async fn get_dashboard(&self, request: &DashboardRequest) -> Result<Dashboard, DashboardError> {
        request.window.validate()?;

        let city_series = self.load_city_series(request).await?;
        let mode = if request.metric.is_additive() {
            CombineMode::Sum
        } else {
            CombineMode::Mean
        };
        let filter = ViewFilter {
            range: None,
            city: request.city.clone(),
            category: request.category.clone(),
        };
        let (combined, stats) = aggregate_view(&city_series, &filter, mode)?;

        let title = self.title(request);
        let tiles = self.build_tiles(request.metric, &stats);
        let mut charts = vec![self.main_chart(request, &title, combined.clone(), &city_series)];
        if request.metric == Metric::Consumption {
            charts.push(self.prediction_chart(request, combined)?);
        }

        tracing::debug!(
            "Built {} dashboard for {} with {} tiles and {} charts",
            request.metric,
            request.city,
            tiles.len(),
            charts.len()
        );
        Ok(Dashboard::new(title, request.city.clone(), request.metric, request.window, tiles, charts))
    }

    /// Equipment shares for the selection, summed per category across cities.
    pub async fn distribution(&self, city: &CitySelection) -> Result<Vec<CategoryShare>, DashboardError> {
        let mut totals: Vec<DistributionEntry> = Vec::new();
        for city_id in city.city_ids() {
            for entry in self.repository.equipment_breakdown(city_id).await? {
                match totals.iter_mut().find(|t| t.name == entry.name) {
                    Some(total) => total.raw_value += entry.raw_value,
                    None => totals.push(entry),
                }
            }
        }
        distribution(&totals)
    }

    pub async fn heatmap(&self, mode: HeatmapMode) -> Result<Heatmap, DashboardError> {
        let rows = self.repository.heatmap_profile(mode).await?;
        Ok(build_heatmap(mode, &rows))
    }

    pub fn forecast(&self, city: &CitySelection, start_hour: u32) -> Vec<HourlyForecast> {
        hourly_forecast(start_hour, self.selection_scale(city), &self.tariffs)
    }

    /// Cost against projection for the selection's share of site-wide cost.
    pub async fn savings(&self, city: &CitySelection, mode: SavingsMode) -> Result<SavingsReport, DashboardError> {
        let rows = self.repository.cost_history(mode).await?;
        Ok(savings_report(mode, &rows, self.selection_scale(city)))
    }

    /// Consumption per period against a target set `target_factor` below the
    /// window's average.
    pub async fn benchmark(&self, city: &CitySelection, window: TimeWindow) -> Result<Benchmark, DashboardError> {
        window.validate()?;
        let request = DashboardRequest {
            city: city.clone(),
            metric: Metric::Consumption,
            window,
            category: None,
        };
        let city_series = self.load_city_series(&request).await?;
        let filter = ViewFilter {
            range: None,
            city: city.clone(),
            category: None,
        };
        let (combined, stats) = aggregate_view(&city_series, &filter, CombineMode::Sum)?;
        let target = stats.average * self.tariffs.target_factor;

        let result = benchmark(&combined, target);
        tracing::debug!(
            "Benchmark for {}: {} of {} periods over a {:.1} kWh target",
            city,
            result.periods_over_target,
            result.points.len(),
            target
        );
        Ok(result)
    }

    fn selection_scale(&self, city: &CitySelection) -> f64 {
        city.city_ids()
            .into_iter()
            .map(|id| self.widgets_config.city_scale(id))
            .sum()
    }

    async fn load_city_series(&self, request: &DashboardRequest) -> Result<Vec<CitySeries>, DashboardError> {
        let mut series = Vec::new();
        for city_id in request.city.city_ids() {
            let points = self
                .repository
                .city_series(city_id, request.metric, request.window)
                .await?;

            if request.category.is_none() {
                series.push(CitySeries {
                    city: city_id.to_string(),
                    category: None,
                    points,
                });
                continue;
            }

            // Split the city's series by equipment share; ratios are not split.
            let breakdown = self.repository.equipment_breakdown(city_id).await?;
            let total: f64 = breakdown.iter().map(|e| e.raw_value).sum();
            for entry in breakdown {
                let share = if request.metric.is_additive() && total > 0.0 {
                    entry.raw_value / total
                } else {
                    1.0
                };
                series.push(CitySeries {
                    city: city_id.to_string(),
                    category: Some(entry.name),
                    points: scale(&points, share),
                });
            }
        }
        Ok(series)
    }

    fn title(&self, request: &DashboardRequest) -> String {
        let vars = HashMap::from([
            ("city".to_string(), request.city.to_string()),
            ("metric".to_string(), request.metric.to_string()),
            ("count".to_string(), request.window.count.to_string()),
            ("unit".to_string(), request.window.unit.to_string()),
        ]);
        prepare_label(&self.widgets_config.title_template, &vars)
    }

    fn build_tiles(&self, metric: Metric, stats: &SeriesStats) -> Vec<TileData> {
        let unit = metric.unit();
        let mut tiles = Vec::new();

        if metric.is_additive() {
            tiles.push(TileData::new("total", "Total", unit, stats.total, 1));
        }
        tiles.push(TileData::new("average", "Average", unit, stats.average, 1));
        tiles.push(TileData::new(
            "peak",
            "Peak",
            unit,
            stats.peak.map(|p| p.value).unwrap_or(0.0),
            1,
        ));
        tiles.push(TileData::new("trend", "Trend", "%", stats.trend_percent, 1));

        if metric == Metric::Consumption {
            let kwh = stats.total;
            tiles.push(TileData::new("cost", "Cost", Metric::Cost.unit(), kwh * self.tariffs.price_per_kwh, 2));
            tiles.push(TileData::new(
                "co2",
                "CO2 emissions",
                Metric::Co2.unit(),
                kwh * self.tariffs.carbon_factor_kg_per_kwh,
                1,
            ));
            tiles.push(TileData::new("target", "Target", unit, kwh * self.tariffs.target_factor, 1));
        }
        tiles
    }

    fn main_chart(
        &self,
        request: &DashboardRequest,
        title: &str,
        combined: Vec<SeriesPoint>,
        city_series: &[CitySeries],
    ) -> ChartData {
        let max_points = self.widgets_config.max_chart_points;
        let mut series = vec![SeriesData::new(
            "combined".to_string(),
            request.city.to_string(),
            Some(ColorToken::Primary.as_str().to_string()),
            downsample_points(combined, max_points),
        )];

        if request.city == CitySelection::All && request.category.is_none() {
            series.extend(city_series.iter().map(|s| {
                SeriesData::new(
                    s.city.clone(),
                    s.city.clone(),
                    None,
                    downsample_points(s.points.clone(), max_points),
                )
            }));
        }

        let chart = ChartData::new(
            format!("{}-chart", request.metric),
            title.to_string(),
            Some(request.metric.unit().to_string()),
            series,
        );
        match request.metric {
            Metric::Efficiency => chart.with_range(Some(0.0), Some(100.0)),
            _ => chart,
        }
    }

    /// Actuals up to the middle of the window, prediction from there on.
    fn prediction_chart(&self, request: &DashboardRequest, combined: Vec<SeriesPoint>) -> Result<ChartData, DashboardError> {
        let window = request.window;
        let cursor = window.count / 2;
        let shape = self
            .widgets_config
            .shape_for(Metric::Consumption, window.unit)
            .ok_or_else(|| DashboardError::InvalidShape(format!("no consumption shape for {}", window.unit)))?
            .scaled(self.selection_scale(&request.city) * PREDICTION_FACTOR);
        let prediction = generate_partial(&window, &shape, Some(self.seed), cursor, PartialSide::Before)?;

        let mut actual = combined;
        for point in &mut actual[cursor..] {
            point.value = None;
        }

        let max_points = self.widgets_config.max_chart_points;
        Ok(ChartData::new(
            "prediction-chart".to_string(),
            "Actual vs prediction".to_string(),
            Some(Metric::Consumption.unit().to_string()),
            vec![
                SeriesData::new(
                    "actual".to_string(),
                    "Actual".to_string(),
                    Some(ColorToken::Primary.as_str().to_string()),
                    downsample_points(actual, max_points),
                ),
                SeriesData::new(
                    "prediction".to_string(),
                    "Prediction".to_string(),
                    Some(ColorToken::Secondary.as_str().to_string()),
                    downsample_points(prediction, max_points),
                ),
            ],
        ))
    }
}

fn scale(points: &[SeriesPoint], factor: f64) -> Vec<SeriesPoint> {
    points
        .iter()
        .map(|p| SeriesPoint::new(p.label.clone(), p.value.map(|v| v * factor)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeUnit;
    use crate::infrastructure::synthetic_repository::SyntheticRepository;

    fn service() -> DashboardService {
        let repository = SyntheticRepository::new(WidgetsConfig::default(), TariffSettings::default(), 42);
        DashboardService::new(Arc::new(repository), WidgetsConfig::default(), TariffSettings::default(), 42)
    }

    fn request(city: CitySelection, metric: Metric) -> DashboardRequest {
        DashboardRequest {
            city,
            metric,
            window: TimeWindow::hourly(),
            category: None,
        }
    }

    fn tile<'a>(dashboard: &'a Dashboard, id: &str) -> &'a TileData {
        dashboard.tiles.iter().find(|t| t.id == id).unwrap()
    }

    #[tokio::test]
    async fn test_all_cities_sum_to_combined_total() {
        let svc = service();
        let all = svc
            .get_dashboard(&request(CitySelection::All, Metric::Consumption))
            .await
            .unwrap();

        let mut sum = 0.0;
        for city in ["lima", "arequipa", "trujillo"] {
            let single = svc
                .get_dashboard(&request(CitySelection::City(city.to_string()), Metric::Consumption))
                .await
                .unwrap();
            sum += tile(&single, "total").value;
        }
        assert!((tile(&all, "total").value - sum).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_consumption_tiles_derive_cost_and_co2() {
        let dashboard = service()
            .get_dashboard(&request(CitySelection::City("lima".to_string()), Metric::Consumption))
            .await
            .unwrap();
        let total = tile(&dashboard, "total").value;
        assert!((tile(&dashboard, "cost").value - total * 0.3).abs() < 1e-6);
        assert!((tile(&dashboard, "co2").value - total * 0.45).abs() < 1e-6);
        assert!((tile(&dashboard, "target").value - total * 0.85).abs() < 1e-6);
        assert_eq!(dashboard.charts.len(), 2);
        assert_eq!(dashboard.title, "lima consumption (last 24 hours)");
    }

    #[tokio::test]
    async fn test_all_selection_charts_every_city() {
        let dashboard = service()
            .get_dashboard(&request(CitySelection::All, Metric::Consumption))
            .await
            .unwrap();
        assert_eq!(dashboard.charts[0].series.len(), 4);
    }

    #[tokio::test]
    async fn test_prediction_chart_splits_at_cursor() {
        let dashboard = service()
            .get_dashboard(&request(CitySelection::All, Metric::Consumption))
            .await
            .unwrap();
        let chart = &dashboard.charts[1];
        let actual = &chart.series[0].points;
        let prediction = &chart.series[1].points;
        assert!(actual[..12].iter().all(|p| p.value.is_some()));
        assert!(actual[12..].iter().all(|p| p.value.is_none()));
        assert!(prediction[..12].iter().all(|p| p.value.is_none()));
        assert!(prediction[12..].iter().all(|p| p.value.is_some()));
    }

    #[tokio::test]
    async fn test_efficiency_is_averaged_and_bounded() {
        let dashboard = service()
            .get_dashboard(&request(CitySelection::All, Metric::Efficiency))
            .await
            .unwrap();
        assert!(dashboard.tiles.iter().all(|t| t.id != "total"));
        assert!(tile(&dashboard, "peak").value <= 100.0);
        assert_eq!(dashboard.charts.len(), 1);
        assert_eq!(dashboard.charts[0].y_max, Some(100.0));
    }

    #[tokio::test]
    async fn test_category_view_takes_equipment_share() {
        let svc = service();
        let lima = CitySelection::City("lima".to_string());
        let whole = svc.get_dashboard(&request(lima.clone(), Metric::Consumption)).await.unwrap();
        let mut hvac_request = request(lima, Metric::Consumption);
        hvac_request.category = Some("hvac".to_string());
        let hvac = svc.get_dashboard(&hvac_request).await.unwrap();

        let expected = tile(&whole, "total").value * 113.0 / 252.0;
        assert!((tile(&hvac, "total").value - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let mut req = request(CitySelection::All, Metric::Consumption);
        req.category = Some("elevators".to_string());
        let err = service().get_dashboard(&req).await.unwrap_err();
        assert_eq!(err, DashboardError::UnknownCategory("elevators".to_string()));
    }

    #[tokio::test]
    async fn test_long_windows_are_downsampled() {
        let mut req = request(CitySelection::City("trujillo".to_string()), Metric::Consumption);
        req.window = TimeWindow::new(TimeUnit::Hour, 720);
        let dashboard = service().get_dashboard(&req).await.unwrap();
        assert!(dashboard.charts.iter().flat_map(|c| &c.series).all(|s| s.points.len() <= 150));
    }

    #[tokio::test]
    async fn test_distribution_for_all_cities_keeps_site_shares() {
        let shares = service().distribution(&CitySelection::All).await.unwrap();
        assert_eq!(shares[0].name, "HVAC");
        assert!((shares[0].percentage - 44.8).abs() < 1e-9);
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() <= 0.5);
    }

    #[tokio::test]
    async fn test_heatmap_modes() {
        let svc = service();
        let daily = svc.heatmap(HeatmapMode::Daily).await.unwrap();
        assert_eq!(daily.cells.len(), 7 * 24);
        let monthly = svc.heatmap(HeatmapMode::Monthly).await.unwrap();
        assert_eq!(monthly.cells.len(), 12 * 31);
        assert!(monthly.cells.iter().any(|c| c.consumption.is_none()));
    }

    #[tokio::test]
    async fn test_savings_follow_selection_share() {
        let svc = service();
        let all = svc.savings(&CitySelection::All, SavingsMode::Monthly).await.unwrap();
        assert_eq!(all.periods.len(), 6);
        assert!((all.total_savings - 19_100.0).abs() < 1e-6);
        assert!((all.savings_growth_percent - 800.0 / 27.0).abs() < 1e-9);

        let lima = svc
            .savings(&CitySelection::City("lima".to_string()), SavingsMode::Monthly)
            .await
            .unwrap();
        assert!((lima.total_savings - all.total_savings * 0.338).abs() < 1e-6);
        assert_eq!(lima.average_efficiency, all.average_efficiency);

        let yearly = svc.savings(&CitySelection::All, SavingsMode::Yearly).await.unwrap();
        assert!((yearly.total_savings - 225_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_benchmark_targets_below_average() {
        let svc = service();
        let window = TimeWindow::new(TimeUnit::Month, 12);
        let all = svc.benchmark(&CitySelection::All, window).await.unwrap();
        assert_eq!(all.points.len(), 12);

        let dashboard = svc
            .get_dashboard(&DashboardRequest {
                city: CitySelection::All,
                metric: Metric::Consumption,
                window,
                category: None,
            })
            .await
            .unwrap();
        let average = tile(&dashboard, "average").value;
        assert!((all.target - average * 0.85).abs() < 1e-6);
        assert_eq!(
            all.periods_over_target,
            all.points.iter().filter(|p| p.actual.is_some_and(|v| v > all.target)).count()
        );
        assert_eq!(all.current, all.points[11].actual);
    }

    #[tokio::test]
    async fn test_benchmark_rejects_bad_window() {
        let err = service()
            .benchmark(&CitySelection::All, TimeWindow::new(TimeUnit::Day, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidWindow(_)));
    }

    #[test]
    fn test_forecast_scales_with_selection() {
        let svc = service();
        let all = svc.forecast(&CitySelection::All, 8);
        let lima = svc.forecast(&CitySelection::City("lima".to_string()), 8);
        assert_eq!(all.len(), 24);
        assert!((lima[0].kwh - all[0].kwh * 0.338).abs() < 1e-6);
    }
}

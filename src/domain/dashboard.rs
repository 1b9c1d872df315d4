// Dashboard domain model
use super::city::CitySelection;
use super::series::{Metric, TimeWindow};
use super::telemetry::{ChartData, TileData};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub city: CitySelection,
    pub metric: Metric,
    pub window: TimeWindow,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
}

impl Dashboard {
    pub fn new(
        title: String,
        city: CitySelection,
        metric: Metric,
        window: TimeWindow,
        tiles: Vec<TileData>,
        charts: Vec<ChartData>,
    ) -> Self {
        Self {
            title,
            city,
            metric,
            window,
            tiles,
            charts,
        }
    }
}

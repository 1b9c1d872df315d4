// Consumption heatmap domain models
use crate::domain::error::DashboardError;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMode {
    /// Weekdays by hour of day.
    Daily,
    /// Months by day of month.
    Monthly,
}

impl HeatmapMode {
    pub fn max_consumption(self) -> f64 {
        match self {
            HeatmapMode::Daily => 99.0,
            HeatmapMode::Monthly => 3500.0,
        }
    }

    pub fn columns(self) -> usize {
        match self {
            HeatmapMode::Daily => 24,
            HeatmapMode::Monthly => 31,
        }
    }
}

impl FromStr for HeatmapMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(HeatmapMode::Daily),
            "monthly" => Ok(HeatmapMode::Monthly),
            other => Err(DashboardError::InvalidWindow(format!("unknown heatmap mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub row: String,
    /// Hour (0-23) in daily mode, day of month (1-31) in monthly mode.
    pub column: usize,
    pub consumption: Option<f64>,
    pub intensity: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    pub mode: HeatmapMode,
    pub rows: Vec<String>,
    pub cells: Vec<HeatmapCell>,
}

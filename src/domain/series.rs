// Time-series domain models
use crate::domain::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hour,
    Day,
    Month,
}

impl TimeUnit {
    /// Length of one natural cycle, used as the default harmonic period.
    pub fn natural_period(self) -> f64 {
        match self {
            TimeUnit::Hour => 24.0,
            TimeUnit::Day => 7.0,
            TimeUnit::Month => 12.0,
        }
    }

    pub fn label(self, index: usize) -> String {
        match self {
            TimeUnit::Hour => format!("{:02}:00", index % 24),
            TimeUnit::Day => format!("D{}", index + 1),
            TimeUnit::Month => format!("M{}", index + 1),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" | "hourly" => Ok(TimeUnit::Hour),
            "day" | "daily" => Ok(TimeUnit::Day),
            "month" | "monthly" => Ok(TimeUnit::Month),
            other => Err(DashboardError::InvalidWindow(format!("unknown unit '{other}'"))),
        }
    }
}

/// Largest window a caller may ask for: one leap year of hours.
pub const MAX_WINDOW_POINTS: usize = 8784;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub unit: TimeUnit,
    pub count: usize,
}

impl TimeWindow {
    pub fn new(unit: TimeUnit, count: usize) -> Self {
        Self { unit, count }
    }

    pub fn hourly() -> Self {
        Self::new(TimeUnit::Hour, 24)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.count == 0 {
            return Err(DashboardError::InvalidWindow(
                "count must be greater than zero".to_string(),
            ));
        }
        if self.count > MAX_WINDOW_POINTS {
            return Err(DashboardError::InvalidWindow(format!(
                "count {} exceeds the {MAX_WINDOW_POINTS}-point limit",
                self.count
            )));
        }
        Ok(())
    }
}

/// Shape parameters for a synthetic series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesShape {
    pub baseline: f64,
    pub amplitude: f64,
    #[serde(default)]
    pub noise_bound: f64,
    #[serde(default)]
    pub floor: f64,
    #[serde(default)]
    pub ceiling: Option<f64>,
    /// Harmonic period in points. Falls back to the unit's natural cycle.
    #[serde(default)]
    pub period: Option<f64>,
    #[serde(default)]
    pub phase: f64,
}

impl SeriesShape {
    pub fn new(baseline: f64, amplitude: f64) -> Self {
        Self {
            baseline,
            amplitude,
            noise_bound: 0.0,
            floor: 0.0,
            ceiling: None,
            period: None,
            phase: 0.0,
        }
    }

    pub fn with_noise(mut self, noise_bound: f64) -> Self {
        self.noise_bound = noise_bound;
        self
    }

    pub fn with_bounds(mut self, floor: f64, ceiling: Option<f64>) -> Self {
        self.floor = floor;
        self.ceiling = ceiling;
        self
    }

    pub fn with_period(mut self, period: f64, phase: f64) -> Self {
        self.period = Some(period);
        self.phase = phase;
        self
    }

    /// Same shape with baseline, amplitude and noise multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            baseline: self.baseline * factor,
            amplitude: self.amplitude * factor,
            noise_bound: self.noise_bound * factor,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        let finite = [self.baseline, self.amplitude, self.noise_bound, self.floor, self.phase];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(DashboardError::InvalidShape("parameters must be finite".to_string()));
        }
        if self.noise_bound < 0.0 {
            return Err(DashboardError::InvalidShape("noise bound must not be negative".to_string()));
        }
        if let Some(period) = self.period {
            if !period.is_finite() || period <= 0.0 {
                return Err(DashboardError::InvalidShape("period must be positive".to_string()));
            }
        }
        if let Some(ceiling) = self.ceiling {
            if !ceiling.is_finite() || ceiling < self.floor {
                return Err(DashboardError::InvalidShape(format!(
                    "ceiling {ceiling} is below floor {}",
                    self.floor
                )));
            }
        }
        Ok(())
    }
}

/// A single bucket. `value` is `None` when the bucket has no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: Option<f64>,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: Option<f64>) -> Self {
        Self { label: label.into(), value }
    }

    pub fn present(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, Some(value))
    }
}

/// Metrics the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Consumption,
    Cost,
    Co2,
    Efficiency,
}

impl Metric {
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Consumption => "kWh",
            Metric::Cost => "S/",
            Metric::Co2 => "kg",
            Metric::Efficiency => "%",
        }
    }

    /// Efficiency is a ratio, so cross-city views average it instead of summing.
    pub fn is_additive(self) -> bool {
        !matches!(self, Metric::Efficiency)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Consumption => "consumption",
            Metric::Cost => "cost",
            Metric::Co2 => "co2",
            Metric::Efficiency => "efficiency",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consumption" | "kwh" => Ok(Metric::Consumption),
            "cost" => Ok(Metric::Cost),
            "co2" => Ok(Metric::Co2),
            "efficiency" => Ok(Metric::Efficiency),
            other => Err(DashboardError::UnknownMetric(other.to_string())),
        }
    }
}

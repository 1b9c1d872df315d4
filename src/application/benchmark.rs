// Consumption measured against a flat target
use crate::application::aggregator::trend_percent;
use crate::domain::series::SeriesPoint;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkPoint {
    pub label: String,
    pub actual: Option<f64>,
    pub target: f64,
    pub over_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benchmark {
    pub target: f64,
    /// Latest period that carried data.
    pub current: Option<f64>,
    /// The period with data before `current`.
    pub previous: Option<f64>,
    pub change_percent: f64,
    pub over_target: bool,
    pub periods_over_target: usize,
    pub points: Vec<BenchmarkPoint>,
}

/// Compares every point with `target`. No-data points are never over target.
/// The change from `previous` to `current` is 0 when either is missing or
/// `previous` is 0.
pub fn benchmark(points: &[SeriesPoint], target: f64) -> Benchmark {
    let compared: Vec<BenchmarkPoint> = points
        .iter()
        .map(|p| BenchmarkPoint {
            label: p.label.clone(),
            actual: p.value,
            target,
            over_target: p.value.is_some_and(|v| v > target),
        })
        .collect();

    let mut present = points.iter().rev().filter_map(|p| p.value);
    let current = present.next();
    let previous = present.next();
    let change_percent = match (current, previous) {
        (Some(current), Some(previous)) => trend_percent(current, previous),
        _ => 0.0,
    };

    Benchmark {
        target,
        current,
        previous,
        change_percent,
        over_target: current.is_some_and(|c| c > target),
        periods_over_target: compared.iter().filter(|p| p.over_target).count(),
        points: compared,
    }
}

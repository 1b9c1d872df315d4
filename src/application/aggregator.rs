// View-model aggregation over generated or ingested series
use crate::domain::city::CitySelection;
use crate::domain::error::DashboardError;
use crate::domain::series::SeriesPoint;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub total: f64,
    pub average: f64,
    pub peak: Option<Extreme>,
    pub trough: Option<Extreme>,
    pub trend_percent: f64,
    /// Number of points that carried data.
    pub present: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateFilter {
    /// Index range to aggregate over, clipped to the series.
    pub range: Option<Range<usize>>,
}

/// How aligned series from several cities collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    Sum,
    Mean,
}

/// A series tagged with the city and optional equipment category it belongs to.
#[derive(Debug, Clone)]
pub struct CitySeries {
    pub city: String,
    pub category: Option<String>,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewFilter {
    pub range: Option<Range<usize>>,
    pub city: CitySelection,
    pub category: Option<String>,
}

/// Totals, extremes and trend for one series.
///
/// The series is split in two halves (the later half takes the odd point);
/// the trend compares the later half's total against the earlier one and is 0
/// when the earlier total is 0. No-data points count as 0 toward totals and are
/// ignored by the average and the extremes. Ties report the earliest index.
pub fn aggregate(series: &[SeriesPoint], filter: &AggregateFilter) -> SeriesStats {
    let range = clip(filter.range.clone(), series.len());
    let offset = range.start;
    let window = &series[range];

    let mut total = 0.0;
    let mut present = 0usize;
    let mut peak: Option<Extreme> = None;
    let mut trough: Option<Extreme> = None;

    for (i, point) in window.iter().enumerate() {
        let Some(value) = point.value else { continue };
        total += value;
        present += 1;
        let candidate = Extreme { index: offset + i, value };
        if peak.is_none_or(|p| value > p.value) {
            peak = Some(candidate);
        }
        if trough.is_none_or(|t| value < t.value) {
            trough = Some(candidate);
        }
    }

    let average = if present == 0 { 0.0 } else { total / present as f64 };
    let mid = window.len() / 2;
    let previous_total = period_total(&window[..mid]);
    let last_total = period_total(&window[mid..]);

    SeriesStats {
        total,
        average,
        peak,
        trough,
        trend_percent: trend_percent(last_total, previous_total),
        present,
    }
}

/// Percent change from `previous` to `last`; 0 when `previous` is 0.
pub fn trend_percent(last: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (last - previous) / previous * 100.0
}

/// Element-wise combination of aligned series. A combined point has no data
/// only when every input lacks data at that index.
pub fn combine(series: &[&[SeriesPoint]], mode: CombineMode) -> Result<Vec<SeriesPoint>, DashboardError> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    let expected = first.len();
    if let Some(misaligned) = series.iter().find(|s| s.len() != expected) {
        return Err(DashboardError::ShapeMismatch {
            expected,
            found: misaligned.len(),
        });
    }

    Ok((0..expected)
        .map(|i| {
            let values: Vec<f64> = series.iter().filter_map(|s| s[i].value).collect();
            let value = match (values.is_empty(), mode) {
                (true, _) => None,
                (false, CombineMode::Sum) => Some(values.iter().sum()),
                (false, CombineMode::Mean) => Some(values.iter().sum::<f64>() / values.len() as f64),
            };
            SeriesPoint::new(first[i].label.clone(), value)
        })
        .collect())
}

/// Selects the series matching the city and category filters, combines them,
/// and aggregates the result.
pub fn aggregate_view(
    series: &[CitySeries],
    filter: &ViewFilter,
    mode: CombineMode,
) -> Result<(Vec<SeriesPoint>, SeriesStats), DashboardError> {
    let by_city: Vec<&CitySeries> = series
        .iter()
        .filter(|s| match &filter.city {
            CitySelection::All => true,
            CitySelection::City(id) => &s.city == id,
        })
        .collect();
    if let (CitySelection::City(id), true) = (&filter.city, by_city.is_empty()) {
        return Err(DashboardError::UnknownCity(id.clone()));
    }

    let selected: Vec<&[SeriesPoint]> = by_city
        .into_iter()
        .filter(|s| match &filter.category {
            None => true,
            Some(category) => s
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category)),
        })
        .map(|s| s.points.as_slice())
        .collect();
    if let (Some(category), true) = (&filter.category, selected.is_empty()) {
        return Err(DashboardError::UnknownCategory(category.clone()));
    }

    let combined = combine(&selected, mode)?;
    let stats = aggregate(
        &combined,
        &AggregateFilter {
            range: filter.range.clone(),
        },
    );
    Ok((combined, stats))
}

/// Bucket-averages a series down to at most `max_points` points. Buckets keep
/// the middle point's label; a bucket with no data stays empty.
pub fn downsample_points(points: Vec<SeriesPoint>, max_points: usize) -> Vec<SeriesPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = (points.len() as f64 / max_points as f64).ceil() as usize;
    points
        .chunks(bucket_size)
        .map(|chunk| {
            let mid_idx = chunk.len() / 2;
            let values: Vec<f64> = chunk.iter().filter_map(|p| p.value).collect();
            let value = if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            };
            SeriesPoint::new(chunk[mid_idx].label.clone(), value)
        })
        .collect()
}

fn period_total(points: &[SeriesPoint]) -> f64 {
    points.iter().filter_map(|p| p.value).sum()
}

fn clip(range: Option<Range<usize>>, len: usize) -> Range<usize> {
    match range {
        Some(r) => {
            let start = r.start.min(len);
            let end = r.end.clamp(start, len);
            start..end
        }
        None => 0..len,
    }
}

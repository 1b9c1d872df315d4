// Deterministic synthetic series generation
use crate::domain::error::DashboardError;
use crate::domain::series::{SeriesPoint, SeriesShape, TimeWindow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Which side of a cursor carries no data in a partial window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialSide {
    /// `[0, cursor)` is empty: a forecast that starts at the cursor.
    Before,
    /// `[cursor, count)` is empty: actuals that stop at the cursor.
    After,
}

/// Generates `window.count` points of
/// `clamp(baseline + amplitude * sin(2π (i + phase) / period) + noise(i), floor, ceiling)`.
///
/// Noise is uniform in `[-noise_bound, noise_bound]` and drawn from a generator
/// seeded with `seed`; without a seed the series is pure harmonics. Equal
/// inputs always yield equal outputs.
pub fn generate(
    window: &TimeWindow,
    shape: &SeriesShape,
    seed: Option<u64>,
) -> Result<Vec<SeriesPoint>, DashboardError> {
    window.validate()?;
    shape.validate()?;

    let period = shape.period.unwrap_or_else(|| window.unit.natural_period());
    let mut rng = seed.map(StdRng::seed_from_u64);

    let points = (0..window.count)
        .map(|i| {
            let harmonic = (2.0 * PI * (i as f64 + shape.phase) / period).sin();
            let noise = match rng.as_mut() {
                Some(rng) if shape.noise_bound > 0.0 => {
                    rng.gen_range(-shape.noise_bound..=shape.noise_bound)
                }
                _ => 0.0,
            };
            let value = clamp(
                shape.baseline + shape.amplitude * harmonic + noise,
                shape.floor,
                shape.ceiling,
            );
            SeriesPoint::present(window.unit.label(i), value)
        })
        .collect();

    Ok(points)
}

/// Like [`generate`], with one side of `cursor` replaced by explicit no-data points.
pub fn generate_partial(
    window: &TimeWindow,
    shape: &SeriesShape,
    seed: Option<u64>,
    cursor: usize,
    side: PartialSide,
) -> Result<Vec<SeriesPoint>, DashboardError> {
    if cursor > window.count {
        return Err(DashboardError::InvalidWindow(format!(
            "cursor {cursor} is past the end of a {}-point window",
            window.count
        )));
    }

    let mut points = generate(window, shape, seed)?;
    let masked = match side {
        PartialSide::Before => 0..cursor,
        PartialSide::After => cursor..points.len(),
    };
    for point in &mut points[masked] {
        point.value = None;
    }
    Ok(points)
}

fn clamp(value: f64, floor: f64, ceiling: Option<f64>) -> f64 {
    let value = value.max(floor);
    match ceiling {
        Some(ceiling) => value.min(ceiling),
        None => value,
    }
}

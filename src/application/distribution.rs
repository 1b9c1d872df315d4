// Categorical share table
use crate::domain::distribution::{CategoryShare, ColorToken, DistributionEntry};
use crate::domain::error::DashboardError;

/// Converts raw category values into percentage shares.
///
/// Shares are ordered by descending raw value; equal values keep their input
/// order. Percentages are rounded to one decimal, so the total is 100 within
/// rounding.
pub fn distribution(entries: &[DistributionEntry]) -> Result<Vec<CategoryShare>, DashboardError> {
    if let Some(bad) = entries
        .iter()
        .find(|e| !e.raw_value.is_finite() || e.raw_value < 0.0)
    {
        return Err(DashboardError::InvalidShape(format!(
            "category '{}' has invalid value {}",
            bad.name, bad.raw_value
        )));
    }

    let total: f64 = entries.iter().map(|e| e.raw_value).sum();
    if !total.is_finite() {
        return Err(DashboardError::InvalidShape("category values overflow their total".to_string()));
    }
    if total <= 0.0 {
        return Err(DashboardError::EmptyDistribution);
    }

    let mut ordered: Vec<&DistributionEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| b.raw_value.total_cmp(&a.raw_value));

    Ok(ordered
        .into_iter()
        .enumerate()
        .map(|(position, entry)| CategoryShare {
            name: entry.name.clone(),
            percentage: round_to_tenth(entry.raw_value / total * 100.0),
            absolute_value: entry.raw_value,
            color: ColorToken::for_position(position),
        })
        .collect())
}

/// Rounds half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

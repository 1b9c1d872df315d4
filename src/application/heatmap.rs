// Consumption heatmap from fixed profile rows
use crate::application::telemetry_repository::ProfileRow;
use crate::domain::heatmap::{Heatmap, HeatmapCell, HeatmapMode};

/// Builds one cell per row and column. Columns past the end of a row (short
/// months) have no data. Intensity is consumption over the mode's maximum,
/// clamped to `[0, 1]`.
pub fn build_heatmap(mode: HeatmapMode, rows: &[ProfileRow]) -> Heatmap {
    let max = mode.max_consumption();
    let first_column = match mode {
        HeatmapMode::Daily => 0,
        HeatmapMode::Monthly => 1,
    };

    let cells = rows
        .iter()
        .flat_map(|row| {
            (0..mode.columns()).map(move |i| {
                let consumption = row.values.get(i).copied();
                HeatmapCell {
                    row: row.label.clone(),
                    column: first_column + i,
                    consumption,
                    intensity: consumption.map(|c| (c / max).clamp(0.0, 1.0)),
                }
            })
        })
        .collect();

    Heatmap {
        mode,
        rows: rows.iter().map(|r| r.label.clone()).collect(),
        cells,
    }
}

// Widget view-models: tiles and charts built from series
use super::series::SeriesPoint;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: f64, precision: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<SeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<SeriesPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    MultiLine,
}

impl ChartData {
    pub fn new(id: String, title: String, unit: Option<String>, series: Vec<SeriesData>) -> Self {
        let kind = if series.len() > 1 {
            ChartKind::MultiLine
        } else {
            ChartKind::Line
        };
        Self {
            id,
            title,
            unit,
            kind,
            y_min: None,
            y_max: None,
            series,
        }
    }

    pub fn with_range(mut self, y_min: Option<f64>, y_max: Option<f64>) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_kind_follows_series_count() {
        let single = ChartData::new(
            "c".to_string(),
            "Consumption".to_string(),
            None,
            vec![SeriesData::new("a".to_string(), "A".to_string(), None, vec![])],
        );
        assert_eq!(single.kind, ChartKind::Line);

        let double = ChartData::new(
            "c".to_string(),
            "Consumption".to_string(),
            None,
            vec![
                SeriesData::new("a".to_string(), "A".to_string(), None, vec![]),
                SeriesData::new("b".to_string(), "B".to_string(), None, vec![]),
            ],
        );
        assert_eq!(double.kind, ChartKind::MultiLine);
    }
}

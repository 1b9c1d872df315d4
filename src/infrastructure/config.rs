// Configuration loading for the service and its widgets
use crate::domain::series::{Metric, SeriesShape, TimeUnit};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub refresh: RefreshSettings,
    pub generator: GeneratorSettings,
    pub tariffs: TariffSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    /// Chance per tick that the simulated feed raises an alert.
    pub alert_probability: f64,
    pub alert_feed_capacity: usize,
    pub auto_resolve_secs: i64,
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 15,
            alert_probability: 0.3,
            alert_feed_capacity: 10,
            auto_resolve_secs: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorSettings {
    pub seed: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TariffSettings {
    pub price_per_kwh: f64,
    pub carbon_factor_kg_per_kwh: f64,
    /// Consumption target as a fraction of actual consumption.
    pub target_factor: f64,
}

impl Default for TariffSettings {
    fn default() -> Self {
        Self {
            price_per_kwh: 0.300,
            carbon_factor_kg_per_kwh: 0.45,
            target_factor: 0.85,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetsConfig {
    #[serde(default = "default_shapes")]
    pub shapes: Vec<ShapeConfig>,
    #[serde(default = "default_city_scales")]
    pub city_scales: HashMap<String, f64>,
    #[serde(default = "default_title_template")]
    pub title_template: String,
    #[serde(default = "default_max_chart_points")]
    pub max_chart_points: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShapeConfig {
    pub metric: Metric,
    pub unit: TimeUnit,
    pub shape: SeriesShape,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            shapes: default_shapes(),
            city_scales: default_city_scales(),
            title_template: default_title_template(),
            max_chart_points: default_max_chart_points(),
        }
    }
}

impl WidgetsConfig {
    /// Exact match first, then any shape configured for the metric.
    pub fn shape_for(&self, metric: Metric, unit: TimeUnit) -> Option<&SeriesShape> {
        self.shapes
            .iter()
            .find(|s| s.metric == metric && s.unit == unit)
            .or_else(|| self.shapes.iter().find(|s| s.metric == metric))
            .map(|s| &s.shape)
    }

    pub fn city_scale(&self, city_id: &str) -> f64 {
        self.city_scales.get(city_id).copied().unwrap_or(1.0)
    }
}

fn default_shapes() -> Vec<ShapeConfig> {
    let consumption = |unit, shape| ShapeConfig {
        metric: Metric::Consumption,
        unit,
        shape,
    };
    let efficiency = |unit, shape: SeriesShape| ShapeConfig {
        metric: Metric::Efficiency,
        unit,
        shape: shape.with_noise(5.0).with_bounds(0.0, Some(100.0)),
    };

    vec![
        consumption(
            TimeUnit::Hour,
            SeriesShape::new(800.0, 200.0).with_noise(100.0),
        ),
        consumption(
            TimeUnit::Day,
            SeriesShape::new(19_200.0, 2_400.0).with_noise(1_200.0),
        ),
        consumption(
            TimeUnit::Month,
            SeriesShape::new(8_750.0, 1_500.0).with_noise(400.0),
        ),
        // Hourly efficiency swings on a shorter cycle than consumption.
        efficiency(
            TimeUnit::Hour,
            SeriesShape::new(85.0, 10.0).with_period(std::f64::consts::TAU / 0.3, 0.0),
        ),
        efficiency(TimeUnit::Day, SeriesShape::new(85.0, 10.0)),
        efficiency(TimeUnit::Month, SeriesShape::new(85.0, 10.0)),
    ]
}

fn default_city_scales() -> HashMap<String, f64> {
    HashMap::from([
        ("lima".to_string(), 0.338),
        ("arequipa".to_string(), 0.268),
        ("trujillo".to_string(), 0.394),
    ])
}

fn default_title_template() -> String {
    "${city} ${metric} (last ${count} ${unit}s)".to_string()
}

fn default_max_chart_points() -> usize {
    150
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_widgets_config() -> anyhow::Result<WidgetsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/widgets").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a label
pub fn prepare_label(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_prepare_label() {
        let mut vars = HashMap::new();
        vars.insert("city".to_string(), "lima".to_string());
        vars.insert("count".to_string(), "24".to_string());

        let label = "Consumption in ${city} over ${count}h (${missing})";
        let result = prepare_label(label, &vars);

        assert_eq!(result, "Consumption in lima over 24h (${missing})");
    }

    #[test]
    fn test_app_config_defaults_fill_missing_sections() {
        let settings = Config::builder()
            .add_source(File::from_str("[refresh]\ninterval_secs = 30\n", FileFormat::Toml))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.refresh.alert_feed_capacity, 10);
        assert_eq!(config.generator.seed, 42);
        assert_eq!(config.tariffs.price_per_kwh, 0.300);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_widgets_config_overrides_shapes() {
        let toml = r#"
            max_chart_points = 48

            [[shapes]]
            metric = "consumption"
            unit = "hour"
            shape = { baseline = 500.0, amplitude = 50.0, noise_bound = 10.0, floor = 100.0 }
        "#;
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        let widgets: WidgetsConfig = settings.try_deserialize().unwrap();

        assert_eq!(widgets.max_chart_points, 48);
        let shape = widgets.shape_for(Metric::Consumption, TimeUnit::Hour).unwrap();
        assert_eq!(shape.baseline, 500.0);
        assert_eq!(shape.floor, 100.0);
        // A single configured shape serves every unit of its metric.
        assert!(widgets.shape_for(Metric::Consumption, TimeUnit::Month).is_some());
        assert!(widgets.shape_for(Metric::Efficiency, TimeUnit::Hour).is_none());
        assert_eq!(widgets.city_scale("lima"), 0.338);
    }

    #[test]
    fn test_sample_widgets_file_matches_defaults() {
        let settings = Config::builder()
            .add_source(File::from_str(include_str!("../../config/widgets.toml"), FileFormat::Toml))
            .build()
            .unwrap();
        let sample: WidgetsConfig = settings.try_deserialize().unwrap();
        let defaults = WidgetsConfig::default();

        assert_eq!(sample.title_template, defaults.title_template);
        assert_eq!(sample.max_chart_points, defaults.max_chart_points);
        assert_eq!(sample.city_scales, defaults.city_scales);
        assert_eq!(sample.shapes.len(), defaults.shapes.len());
        for expected in &defaults.shapes {
            let shape = sample.shape_for(expected.metric, expected.unit).unwrap();
            assert_eq!(shape.baseline, expected.shape.baseline);
            assert_eq!(shape.amplitude, expected.shape.amplitude);
            assert_eq!(shape.noise_bound, expected.shape.noise_bound);
            assert_eq!(shape.floor, expected.shape.floor);
            assert_eq!(shape.ceiling, expected.shape.ceiling);
            assert_eq!(shape.phase, expected.shape.phase);
            match (shape.period, expected.shape.period) {
                (Some(actual), Some(wanted)) => assert!((actual - wanted).abs() < 1e-12),
                (actual, wanted) => assert_eq!(actual, wanted),
            }
        }
    }

    #[test]
    fn test_default_shapes_are_valid() {
        let widgets = WidgetsConfig::default();
        for shape in &widgets.shapes {
            assert!(shape.shape.validate().is_ok());
        }
        let total: f64 = widgets.city_scales.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

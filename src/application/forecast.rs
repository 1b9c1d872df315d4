// Hourly consumption forecast for the next day
use crate::infrastructure::config::TariffSettings;
use serde::Serialize;
use std::f64::consts::PI;

const BASE_KWH: f64 = 12.0;
const SWING_KWH: f64 = 8.0;
const PEAK_HOURS: std::ops::RangeInclusive<u32> = 14..=18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBand {
    Peak,
    Low,
    Normal,
}

impl LoadBand {
    pub fn for_hour(hour: u32) -> Self {
        if PEAK_HOURS.contains(&hour) {
            LoadBand::Peak
        } else if hour >= 22 || hour <= 6 {
            LoadBand::Low
        } else {
            LoadBand::Normal
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            LoadBand::Peak => 1.4,
            LoadBand::Low => 0.6,
            LoadBand::Normal => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub hour: String,
    pub kwh: f64,
    pub cost: f64,
    pub co2: f64,
    pub band: LoadBand,
}

/// Forecast for the 24 hours after `start_hour`, scaled by `scale` (the
/// selected cities' share of total load).
pub fn hourly_forecast(start_hour: u32, scale: f64, tariffs: &TariffSettings) -> Vec<HourlyForecast> {
    let start_hour = start_hour % 24;
    (0..24u32)
        .map(|i| {
            let hour = (start_hour + i + 1) % 24;
            let band = LoadBand::for_hour(hour);
            let base = BASE_KWH + SWING_KWH * (f64::from(i + start_hour) * PI / 12.0).sin();
            let kwh = base * band.multiplier() * scale;
            HourlyForecast {
                hour: format!("{hour:02}:00"),
                kwh,
                cost: kwh * tariffs.price_per_kwh,
                co2: kwh * tariffs.carbon_factor_kg_per_kwh,
                band,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        assert_eq!(LoadBand::for_hour(15), LoadBand::Peak);
        assert_eq!(LoadBand::for_hour(23), LoadBand::Low);
        assert_eq!(LoadBand::for_hour(3), LoadBand::Low);
        assert_eq!(LoadBand::for_hour(10), LoadBand::Normal);
    }

    #[test]
    fn test_forecast_from_midnight() {
        let tariffs = TariffSettings::default();
        let forecast = hourly_forecast(0, 1.0, &tariffs);
        assert_eq!(forecast.len(), 24);

        // First entry is 01:00, a low-load hour at the cycle's midpoint.
        assert_eq!(forecast[0].hour, "01:00");
        assert_eq!(forecast[0].band, LoadBand::Low);
        assert!((forecast[0].kwh - 12.0 * 0.6).abs() < 1e-9);
        assert!((forecast[0].cost - forecast[0].kwh * tariffs.price_per_kwh).abs() < 1e-12);

        // i = 6 -> 07:00, sin(pi/2) = 1
        assert_eq!(forecast[6].hour, "07:00");
        assert!((forecast[6].kwh - 20.0).abs() < 1e-9);

        assert!(forecast.iter().all(|f| f.kwh >= 0.0));
    }

    #[test]
    fn test_forecast_scales_and_wraps() {
        let tariffs = TariffSettings::default();
        let full = hourly_forecast(23, 1.0, &tariffs);
        let half = hourly_forecast(23, 0.5, &tariffs);
        assert_eq!(full[0].hour, "00:00");
        assert!((half[5].kwh * 2.0 - full[5].kwh).abs() < 1e-9);
    }
}

// Fixed reference data the synthetic backend serves
use crate::application::savings::{CostRow, SavingsMode};
use crate::application::telemetry_repository::ProfileRow;
use crate::domain::alert::{AlertCategory, AlertDraft, AlertTemplate, Severity};
use crate::domain::city::{City, CityStatus};
use crate::domain::device::{Device, DeviceStatus, DeviceType};
use crate::domain::distribution::DistributionEntry;
use crate::domain::recommendation::{
    RecommendationCategory, RecommendationDraft, RecommendationStatus, SeverityTier,
};
use chrono::{DateTime, Duration, Utc};

pub fn cities() -> Vec<City> {
    let city = |id: &str, name: &str, consumption, cost, co2| City {
        id: id.to_string(),
        name: name.to_string(),
        consumption,
        cost,
        co2,
        status: CityStatus::Normal,
    };
    vec![
        city("lima", "Lima", 12.92, 1359.37, 557.34),
        city("arequipa", "Arequipa", 10.23, 2637.18, 554.35),
        city("trujillo", "Trujillo", 15.07, 2619.25, 553.55),
    ]
}

/// Site-wide kWh per equipment category.
pub fn equipment() -> Vec<DistributionEntry> {
    vec![
        DistributionEntry::new("HVAC", 113.0),
        DistributionEntry::new("Lighting", 63.0),
        DistributionEntry::new("Office equipment", 38.0),
        DistributionEntry::new("Refrigeration", 25.0),
        DistributionEntry::new("Other", 13.0),
    ]
}

pub fn devices() -> Vec<Device> {
    vec![
        Device::new("hvac-main", "Main HVAC system", DeviceType::Hvac, "Ground floor", DeviceStatus::Online, 2.4),
        Device::new("led-office-1", "Office 1 LED lighting", DeviceType::Lighting, "Office 1", DeviceStatus::Online, 0.8),
        Device::new("fan-a3", "Industrial fan A3", DeviceType::Other, "Warehouse", DeviceStatus::Warning, 1.2),
        Device::new("server-main", "Main server", DeviceType::Other, "Server room", DeviceStatus::Online, 0.6),
        Device::new("sensor-zone-b", "Zone B temperature sensor", DeviceType::Sensor, "Zone B", DeviceStatus::Offline, 0.0),
    ]
}

pub fn seed_alerts(now: DateTime<Utc>) -> Vec<AlertDraft> {
    let mut night_baseline = AlertDraft::new(
        Severity::Critical,
        AlertCategory::Efficiency,
        "Elevated night baseline (stand-by)",
        "Off-hours consumption is 40% above normal. Potential saving: S/ 1,200/month.",
        now - Duration::minutes(10),
    );
    night_baseline.source = "AI monitor".to_string();
    night_baseline.city = Some("lima".to_string());
    night_baseline.action = Some("View optimisation".to_string());

    let mut hvac = AlertDraft::new(
        Severity::Warning,
        AlertCategory::Devices,
        "HVAC with irregular pattern",
        "Climate system consumed 25% more than expected over the last 2 hours.",
        now - Duration::minutes(45),
    );
    hvac.source = "Automatic monitoring".to_string();
    hvac.city = Some("arequipa".to_string());
    hvac.action = Some("Review configuration".to_string());

    let mut lighting = AlertDraft::new(
        Severity::Success,
        AlertCategory::Efficiency,
        "Optimisation applied",
        "Automatic lighting adjustments saved S/ 340 this week.",
        now - Duration::hours(2),
    );
    lighting.source = "AI optimiser".to_string();
    lighting.city = Some("lima".to_string());
    lighting.is_read = true;

    let mut report = AlertDraft::new(
        Severity::Info,
        AlertCategory::System,
        "Monthly report available",
        "The March energy efficiency analysis is ready.",
        now - Duration::hours(2) - Duration::minutes(5),
    );
    report.source = "Reporting".to_string();
    report.action = Some("View report".to_string());

    vec![night_baseline, hvac, lighting, report]
}

pub fn alert_templates() -> Vec<AlertTemplate> {
    vec![
        AlertTemplate {
            severity: Severity::Warning,
            category: AlertCategory::Energy,
            title: "Demand peak",
            message: "Energy consumption rose 25% during the last hour",
            source: "Consumption monitor",
            action: Some("Enable efficiency mode"),
            auto_resolve: false,
        },
        AlertTemplate {
            severity: Severity::Info,
            category: AlertCategory::System,
            title: "System update",
            message: "New firmware update available for sensors",
            source: "Device manager",
            action: Some("Schedule update"),
            auto_resolve: false,
        },
        AlertTemplate {
            severity: Severity::Success,
            category: AlertCategory::Efficiency,
            title: "Efficiency goal reached",
            message: "The office zone reached 90% efficiency",
            source: "Efficiency monitor",
            action: None,
            auto_resolve: true,
        },
        AlertTemplate {
            severity: Severity::Critical,
            category: AlertCategory::Devices,
            title: "Communication failure",
            message: "Lost connection with 3 temperature sensors",
            source: "IoT network",
            action: Some("Check connectivity"),
            auto_resolve: false,
        },
    ]
}

pub fn seed_recommendations(now: DateTime<Utc>) -> Vec<RecommendationDraft> {
    let rec = |minutes_ago: i64, tier, category, title: &str, description: &str, savings, confidence, status| {
        RecommendationDraft {
            tier,
            category,
            title: title.to_string(),
            description: description.to_string(),
            savings_estimate: savings,
            confidence,
            status,
            created_at: now - Duration::minutes(minutes_ago),
        }
    };

    vec![
        rec(
            5,
            SeverityTier::Critical,
            RecommendationCategory::Hvac,
            "Optimise climate control schedules",
            "HVAC systems run at full capacity during low-occupancy hours.",
            1250.0,
            94,
            RecommendationStatus::Pending,
        ),
        rec(
            60,
            SeverityTier::High,
            RecommendationCategory::Lighting,
            "Install motion sensors",
            "Lights stay on in unoccupied areas for long periods.",
            780.0,
            89,
            RecommendationStatus::Pending,
        ),
        rec(
            180,
            SeverityTier::Medium,
            RecommendationCategory::Equipment,
            "Calibrate production equipment",
            "Some equipment uses 15% more energy than optimal for its usage pattern.",
            520.0,
            76,
            RecommendationStatus::Implementing,
        ),
        rec(
            1440,
            SeverityTier::Low,
            RecommendationCategory::Scheduling,
            "Reschedule non-critical loads",
            "Move non-critical operations to lower-cost hours.",
            340.0,
            82,
            RecommendationStatus::Completed,
        ),
    ]
}

/// The recommendation produced on demand by the analysis action.
pub fn generated_recommendation(now: DateTime<Utc>) -> RecommendationDraft {
    RecommendationDraft {
        tier: SeverityTier::High,
        category: RecommendationCategory::Hvac,
        title: "Adjust temperature per zone".to_string(),
        description: "Temperature differences allow zoned HVAC control.".to_string(),
        savings_estimate: 960.0,
        confidence: 87,
        status: RecommendationStatus::Pending,
        created_at: now,
    }
}

/// Site-wide cost in soles: (period, billed, projected without optimisation, efficiency %).
pub fn cost_history(mode: SavingsMode) -> Vec<CostRow> {
    let rows: &[(&str, f64, f64, f64)] = match mode {
        SavingsMode::Monthly => &[
            ("Jan", 18_500.0, 21_200.0, 87.3),
            ("Feb", 17_800.0, 20_800.0, 88.1),
            ("Mar", 16_900.0, 20_100.0, 89.2),
            ("Apr", 16_200.0, 19_500.0, 89.8),
            ("May", 15_800.0, 19_200.0, 90.1),
            ("Jun", 15_400.0, 18_900.0, 90.5),
        ],
        SavingsMode::Yearly => &[
            ("2022", 245_000.0, 280_000.0, 85.2),
            ("2023", 220_000.0, 270_000.0, 87.8),
            ("2024", 195_000.0, 260_000.0, 90.1),
            ("2025 (est.)", 175_000.0, 250_000.0, 92.5),
        ],
    };
    rows.iter()
        .map(|(period, actual_cost, projected_cost, efficiency)| CostRow {
            period: period.to_string(),
            actual_cost: *actual_cost,
            projected_cost: *projected_cost,
            efficiency: *efficiency,
        })
        .collect()
}

/// kWh per hour of day, one row per weekday.
pub fn daily_profile() -> Vec<ProfileRow> {
    let rows: [(&str, [f64; 24]); 7] = [
        ("Sun", [24.0, 28.0, 20.0, 27.0, 25.0, 12.0, 47.0, 32.0, 82.0, 92.0, 92.0, 78.0, 88.0, 83.0, 93.0, 78.0, 90.0, 76.0, 92.0, 52.0, 59.0, 57.0, 38.0, 22.0]),
        ("Mon", [26.0, 21.0, 26.0, 13.0, 15.0, 13.0, 47.0, 46.0, 99.0, 80.0, 75.0, 68.0, 60.0, 67.0, 68.0, 86.0, 73.0, 86.0, 75.0, 49.0, 31.0, 60.0, 52.0, 26.0]),
        ("Tue", [11.0, 15.0, 12.0, 12.0, 21.0, 14.0, 44.0, 31.0, 63.0, 68.0, 66.0, 95.0, 91.0, 75.0, 78.0, 96.0, 90.0, 74.0, 75.0, 38.0, 33.0, 55.0, 50.0, 19.0]),
        ("Wed", [30.0, 27.0, 13.0, 13.0, 13.0, 23.0, 54.0, 32.0, 99.0, 88.0, 76.0, 74.0, 90.0, 84.0, 92.0, 83.0, 84.0, 86.0, 78.0, 52.0, 56.0, 35.0, 53.0, 15.0]),
        ("Thu", [22.0, 21.0, 12.0, 15.0, 26.0, 23.0, 35.0, 36.0, 62.0, 74.0, 83.0, 96.0, 98.0, 74.0, 96.0, 84.0, 74.0, 91.0, 88.0, 57.0, 53.0, 36.0, 47.0, 16.0]),
        ("Fri", [10.0, 21.0, 16.0, 19.0, 22.0, 11.0, 15.0, 19.0, 20.0, 23.0, 45.0, 38.0, 60.0, 31.0, 51.0, 47.0, 53.0, 58.0, 45.0, 42.0, 40.0, 18.0, 26.0, 22.0]),
        ("Sat", [23.0, 11.0, 27.0, 16.0, 10.0, 20.0, 20.0, 22.0, 14.0, 25.0, 33.0, 39.0, 33.0, 54.0, 49.0, 31.0, 46.0, 39.0, 30.0, 54.0, 36.0, 11.0, 29.0, 12.0]),
    ];
    rows.iter()
        .map(|(label, values)| ProfileRow {
            label: label.to_string(),
            values: values.to_vec(),
        })
        .collect()
}

/// kWh per day of month, one row per month. Each month oscillates around
/// its own base with a 4-day swing; short months stop early.
pub fn monthly_profile() -> Vec<ProfileRow> {
    const MONTHS: [(&str, usize, f64); 12] = [
        ("Jan", 31, 2980.0),
        ("Feb", 28, 2990.0),
        ("Mar", 31, 2980.0),
        ("Apr", 30, 2970.0),
        ("May", 31, 3010.0),
        ("Jun", 30, 3050.0),
        ("Jul", 31, 3090.0),
        ("Aug", 31, 3130.0),
        ("Sep", 30, 3150.0),
        ("Oct", 31, 3190.0),
        ("Nov", 30, 3230.0),
        ("Dec", 31, 3270.0),
    ];

    MONTHS
        .iter()
        .enumerate()
        .map(|(m, (label, days, base))| ProfileRow {
            label: label.to_string(),
            values: (0..*days)
                .map(|d| {
                    let angle = (d + m * 3) as f64 * std::f64::consts::FRAC_PI_4;
                    (base + 220.0 * angle.sin()).round()
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::city::CITY_IDS;

    #[test]
    fn test_cost_history_projects_above_billed() {
        for mode in [SavingsMode::Monthly, SavingsMode::Yearly] {
            let rows = cost_history(mode);
            assert!(!rows.is_empty());
            assert!(rows.iter().all(|r| r.projected_cost > r.actual_cost));
            assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.efficiency)));
        }
        assert_eq!(cost_history(SavingsMode::Monthly).len(), 6);
    }

    #[test]
    fn test_cities_match_allow_list() {
        let ids: Vec<String> = cities().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, CITY_IDS.to_vec());
    }

    #[test]
    fn test_profiles_fit_heatmap_bounds() {
        let daily = daily_profile();
        assert_eq!(daily.len(), 7);
        assert!(daily.iter().all(|r| r.values.len() == 24));
        assert!(daily.iter().flat_map(|r| &r.values).all(|v| *v <= 99.0));

        let monthly = monthly_profile();
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[1].values.len(), 28);
        assert!(monthly.iter().flat_map(|r| &r.values).all(|v| *v > 2700.0 && *v < 3500.0));
    }

    #[test]
    fn test_seed_alerts_are_ordered_in_time() {
        let now = Utc::now();
        let alerts = seed_alerts(now);
        assert_eq!(alerts.len(), 4);
        assert!(alerts.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }
}

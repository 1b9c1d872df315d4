// Billed cost against the unoptimised projection
use crate::application::aggregator::trend_percent;
use crate::domain::error::DashboardError;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsMode {
    Monthly,
    Yearly,
}

impl FromStr for SavingsMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(SavingsMode::Monthly),
            "yearly" | "year" => Ok(SavingsMode::Yearly),
            other => Err(DashboardError::InvalidWindow(format!("unknown savings mode '{other}'"))),
        }
    }
}

/// One period's billed cost next to what it would have cost without the
/// optimisations.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRow {
    pub period: String,
    pub actual_cost: f64,
    pub projected_cost: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsPeriod {
    pub period: String,
    pub actual_cost: f64,
    pub projected_cost: f64,
    pub savings: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsReport {
    pub mode: SavingsMode,
    pub periods: Vec<SavingsPeriod>,
    pub total_savings: f64,
    pub average_efficiency: f64,
    pub last_period_savings: f64,
    /// Last period's savings against the first period's.
    pub savings_growth_percent: f64,
}

/// Costs are multiplied by `scale`; efficiency is a ratio and is left alone.
/// Growth is 0 with fewer than two periods or when the first period saved
/// nothing.
pub fn savings_report(mode: SavingsMode, rows: &[CostRow], scale: f64) -> SavingsReport {
    let periods: Vec<SavingsPeriod> = rows
        .iter()
        .map(|row| {
            let actual_cost = row.actual_cost * scale;
            let projected_cost = row.projected_cost * scale;
            SavingsPeriod {
                period: row.period.clone(),
                actual_cost,
                projected_cost,
                savings: projected_cost - actual_cost,
                efficiency: row.efficiency,
            }
        })
        .collect();

    let total_savings = periods.iter().map(|p| p.savings).sum();
    let average_efficiency = if periods.is_empty() {
        0.0
    } else {
        periods.iter().map(|p| p.efficiency).sum::<f64>() / periods.len() as f64
    };
    let last_period_savings = periods.last().map(|p| p.savings).unwrap_or(0.0);
    let savings_growth_percent = match (periods.first(), periods.last()) {
        (Some(first), Some(last)) if periods.len() > 1 => trend_percent(last.savings, first.savings),
        _ => 0.0,
    };

    SavingsReport {
        mode,
        periods,
        total_savings,
        average_efficiency,
        last_period_savings,
        savings_growth_percent,
    }
}

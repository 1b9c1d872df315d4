// Recommendation domain model with a forward-only status machine
use super::error::DashboardError;
use super::record::{Record, RecordId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Hvac,
    Lighting,
    Equipment,
    Scheduling,
}

impl FromStr for RecommendationCategory {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hvac" => Ok(RecommendationCategory::Hvac),
            "lighting" => Ok(RecommendationCategory::Lighting),
            "equipment" => Ok(RecommendationCategory::Equipment),
            "scheduling" => Ok(RecommendationCategory::Scheduling),
            other => Err(DashboardError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Implementing,
    Completed,
}

impl RecommendationStatus {
    pub fn next(self) -> Option<Self> {
        match self {
            RecommendationStatus::Pending => Some(RecommendationStatus::Implementing),
            RecommendationStatus::Implementing => Some(RecommendationStatus::Completed),
            RecommendationStatus::Completed => None,
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendationStatus::Pending => "pending",
            RecommendationStatus::Implementing => "implementing",
            RecommendationStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

impl FromStr for RecommendationStatus {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RecommendationStatus::Pending),
            "implementing" => Ok(RecommendationStatus::Implementing),
            "completed" => Ok(RecommendationStatus::Completed),
            other => Err(DashboardError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationDraft {
    pub tier: SeverityTier,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub savings_estimate: f64,
    pub confidence: u8,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: RecordId,
    pub tier: SeverityTier,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub savings_estimate: f64,
    pub confidence: u8,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    /// Moves one step forward. Never regresses; `Completed` is terminal.
    pub fn advance(&mut self) -> Result<RecommendationStatus, DashboardError> {
        let next = self
            .status
            .next()
            .ok_or(DashboardError::InvalidTransition { from: self.status })?;
        self.status = next;
        Ok(next)
    }

    pub fn is_open(&self) -> bool {
        self.status != RecommendationStatus::Completed
    }
}

impl Record for Recommendation {
    type Draft = RecommendationDraft;

    fn assemble(id: RecordId, draft: RecommendationDraft) -> Self {
        Self {
            id,
            tier: draft.tier,
            category: draft.category,
            title: draft.title,
            description: draft.description,
            savings_estimate: draft.savings_estimate.max(0.0),
            confidence: draft.confidence.min(100),
            status: draft.status,
            created_at: draft.created_at,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Error kinds surfaced by the dashboard core
use crate::domain::recommendation::RecommendationStatus;
use crate::domain::record::RecordId;
use thiserror::Error;

/// Every condition here is recoverable by the caller. The presentation layer
/// decides whether to ignore the offending filter or show the error inline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("series are misaligned: expected {expected} points, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("unknown city '{0}'")]
    UnknownCity(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("cannot advance status past {from}")]
    InvalidTransition { from: RecommendationStatus },

    #[error("distribution has no positive total")]
    EmptyDistribution,

    #[error("invalid time window: {0}")]
    InvalidWindow(String),

    #[error("invalid series shape: {0}")]
    InvalidShape(String),

    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("unknown device '{0}'")]
    UnknownDevice(String),

    #[error("dashboard state owner is not running")]
    Unavailable,
}

impl DashboardError {
    /// Stable machine-readable kind, used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::UnknownCity(_) => "unknown_city",
            Self::UnknownCategory(_) => "unknown_category",
            Self::UnknownMetric(_) => "unknown_metric",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::EmptyDistribution => "empty_distribution",
            Self::InvalidWindow(_) => "invalid_window",
            Self::InvalidShape(_) => "invalid_shape",
            Self::NotFound(_) | Self::UnknownDevice(_) => "not_found",
            Self::Unavailable => "unavailable",
        }
    }
}

// Alert domain model and its read/archive lifecycle
use super::error::DashboardError;
use super::record::{Record, RecordId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Priority::High,
            Severity::Warning => Priority::Medium,
            Severity::Info | Severity::Success => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Energy,
    Devices,
    System,
    Efficiency,
}

impl FromStr for AlertCategory {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energy" | "energia" => Ok(AlertCategory::Energy),
            "devices" | "dispositivos" => Ok(AlertCategory::Devices),
            "system" | "sistema" => Ok(AlertCategory::System),
            "efficiency" | "eficiencia" => Ok(AlertCategory::Efficiency),
            other => Err(DashboardError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertDraft {
    pub severity: Severity,
    pub priority: Priority,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub source: String,
    pub city: Option<String>,
    pub action: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub auto_resolve: bool,
    pub simulated: bool,
}

impl AlertDraft {
    pub fn new(
        severity: Severity,
        category: AlertCategory,
        title: &str,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            severity,
            priority: Priority::from(severity),
            category,
            title: title.to_string(),
            message: message.to_string(),
            source: String::new(),
            city: None,
            action: None,
            created_at,
            is_read: false,
            auto_resolve: false,
            simulated: false,
        }
    }
}

/// Canned event the live feed raises at random.
#[derive(Debug, Clone)]
pub struct AlertTemplate {
    pub severity: Severity,
    pub category: AlertCategory,
    pub title: &'static str,
    pub message: &'static str,
    pub source: &'static str,
    pub action: Option<&'static str>,
    pub auto_resolve: bool,
}

impl AlertTemplate {
    pub fn instantiate(&self, created_at: DateTime<Utc>) -> AlertDraft {
        let mut draft = AlertDraft::new(self.severity, self.category, self.title, self.message, created_at);
        draft.source = self.source.to_string();
        draft.action = self.action.map(str::to_string);
        draft.auto_resolve = self.auto_resolve;
        draft.simulated = true;
        draft
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: RecordId,
    pub severity: Severity,
    pub priority: Priority,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub source: String,
    pub city: Option<String>,
    pub action: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub is_archived: bool,
    #[serde(skip)]
    pub auto_resolve: bool,
    #[serde(skip)]
    pub simulated: bool,
}

impl Alert {
    /// Idempotent. Archived alerts are left untouched.
    pub fn mark_read(&mut self) {
        if !self.is_archived {
            self.is_read = true;
        }
    }

    /// Idempotent.
    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    pub fn is_unread(&self) -> bool {
        !self.is_read && !self.is_archived
    }

    pub fn is_active_critical(&self) -> bool {
        self.severity == Severity::Critical && !self.is_archived
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.message.to_lowercase().contains(&needle)
    }
}

impl Record for Alert {
    type Draft = AlertDraft;

    fn assemble(id: RecordId, draft: AlertDraft) -> Self {
        Self {
            id,
            severity: draft.severity,
            priority: draft.priority,
            category: draft.category,
            title: draft.title,
            message: draft.message,
            source: draft.source,
            city: draft.city,
            action: draft.action,
            created_at: draft.created_at,
            is_read: draft.is_read,
            is_archived: false,
            auto_resolve: draft.auto_resolve,
            simulated: draft.simulated,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

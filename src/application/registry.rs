// In-memory alert and recommendation registries
use crate::domain::alert::{Alert, AlertCategory};
use crate::domain::city::CitySelection;
use crate::domain::error::DashboardError;
use crate::domain::recommendation::{Recommendation, RecommendationCategory, RecommendationStatus};
use crate::domain::record::{Record, RecordId};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Ordered record store with monotonic ids.
///
/// Records are kept in insertion order, so a stable sort by recency breaks
/// `created_at` ties by insertion order.
#[derive(Debug)]
pub struct Registry<T: Record> {
    next_id: u64,
    records: Vec<T>,
}

impl<T: Record> Default for Registry<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

impl<T: Record> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, draft: T::Draft) -> &T {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(T::assemble(id, draft));
        tracing::debug!("Registered record {}", id);
        &self.records[self.records.len() - 1]
    }

    pub fn get(&self, id: RecordId) -> Result<&T, DashboardError> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or(DashboardError::NotFound(id))
    }

    fn get_mut(&mut self, id: RecordId) -> Result<&mut T, DashboardError> {
        self.records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(DashboardError::NotFound(id))
    }

    /// Terminal: the id is never reissued.
    pub fn remove(&mut self, id: RecordId) -> Result<T, DashboardError> {
        let position = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(DashboardError::NotFound(id))?;
        tracing::debug!("Removed record {}", id);
        Ok(self.records.remove(position))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    /// Matching records, newest first.
    pub fn select<F>(&self, predicate: F) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        let mut selected: Vec<&T> = self.records.iter().filter(|r| predicate(*r)).collect();
        selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        selected
    }
}

pub type AlertRegistry = Registry<Alert>;
pub type RecommendationRegistry = Registry<Recommendation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertView {
    /// Everything not archived.
    #[default]
    All,
    Unread,
    Critical,
    Archived,
}

impl FromStr for AlertView {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(AlertView::All),
            "unread" => Ok(AlertView::Unread),
            "critical" => Ok(AlertView::Critical),
            "archived" => Ok(AlertView::Archived),
            other => Err(DashboardError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub view: AlertView,
    pub category: Option<AlertCategory>,
    pub city: CitySelection,
    pub search: Option<String>,
}

impl AlertQuery {
    pub fn view(view: AlertView) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        let in_view = match self.view {
            AlertView::All => !alert.is_archived,
            AlertView::Unread => alert.is_unread(),
            AlertView::Critical => alert.is_active_critical(),
            AlertView::Archived => alert.is_archived,
        };
        in_view
            && self.category.is_none_or(|c| alert.category == c)
            && self.city.matches(alert.city.as_deref())
            && self
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .is_none_or(|s| alert.matches_search(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertCounts {
    pub total: usize,
    pub unread: usize,
    pub critical: usize,
    pub archived: usize,
}

impl Registry<Alert> {
    pub fn mark_read(&mut self, id: RecordId) -> Result<&Alert, DashboardError> {
        let alert = self.get_mut(id)?;
        alert.mark_read();
        Ok(&*alert)
    }

    pub fn archive(&mut self, id: RecordId) -> Result<&Alert, DashboardError> {
        let alert = self.get_mut(id)?;
        alert.archive();
        Ok(&*alert)
    }

    pub fn query(&self, query: &AlertQuery) -> Vec<&Alert> {
        self.select(|a| query.matches(a))
    }

    pub fn counts(&self) -> AlertCounts {
        self.iter().fold(AlertCounts::default(), |mut counts, alert| {
            counts.total += 1;
            counts.unread += usize::from(alert.is_unread());
            counts.critical += usize::from(alert.is_active_critical());
            counts.archived += usize::from(alert.is_archived);
            counts
        })
    }

    /// Removes auto-resolving alerts older than `ttl`.
    pub fn sweep_resolved(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<RecordId> {
        let expired: Vec<RecordId> = self
            .iter()
            .filter(|a| a.auto_resolve && now - a.created_at > ttl)
            .map(|a| a.id)
            .collect();
        self.records.retain(|a| !expired.contains(&a.id));
        expired
    }

    /// Keeps at most `capacity` simulated alerts, evicting the oldest.
    pub fn trim_simulated(&mut self, capacity: usize) -> Vec<RecordId> {
        let simulated = self.select(|a| a.simulated);
        let evicted: Vec<RecordId> = simulated.iter().skip(capacity).map(|a| a.id).collect();
        self.records.retain(|a| !evicted.contains(&a.id));
        evicted
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub status: Option<RecommendationStatus>,
    pub category: Option<RecommendationCategory>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecommendationSummary {
    pub pending: usize,
    pub implementing: usize,
    pub completed: usize,
    /// Savings still available from recommendations not yet completed.
    pub open_savings: f64,
    pub average_confidence: f64,
}

impl Registry<Recommendation> {
    /// Forward-only: pending -> implementing -> completed.
    pub fn advance_status(&mut self, id: RecordId) -> Result<&Recommendation, DashboardError> {
        let recommendation = self.get_mut(id)?;
        match recommendation.advance() {
            Ok(status) => tracing::debug!("Recommendation {} advanced to {}", id, status),
            Err(e) => {
                tracing::warn!("Rejected transition for recommendation {}: {}", id, e);
                return Err(e);
            }
        }
        Ok(&*recommendation)
    }

    pub fn query(&self, query: &RecommendationQuery) -> Vec<&Recommendation> {
        self.select(|r| {
            query.status.is_none_or(|s| r.status == s) && query.category.is_none_or(|c| r.category == c)
        })
    }

    pub fn summary(&self) -> RecommendationSummary {
        let mut summary = RecommendationSummary::default();
        let mut confidence_total = 0u32;
        for rec in self.iter() {
            match rec.status {
                RecommendationStatus::Pending => summary.pending += 1,
                RecommendationStatus::Implementing => summary.implementing += 1,
                RecommendationStatus::Completed => summary.completed += 1,
            }
            if rec.is_open() {
                summary.open_savings += rec.savings_estimate;
            }
            confidence_total += u32::from(rec.confidence);
        }
        if !self.is_empty() {
            summary.average_confidence = f64::from(confidence_total) / self.len() as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::{AlertDraft, Severity};
    use crate::domain::recommendation::{RecommendationDraft, SeverityTier};

    fn at(minutes_ago: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() - Duration::minutes(minutes_ago)
    }

    fn draft(severity: Severity, title: &str, minutes_ago: i64) -> AlertDraft {
        AlertDraft::new(severity, AlertCategory::Energy, title, "details", at(minutes_ago))
    }

    fn recommendation(status: RecommendationStatus, savings: f64, confidence: u8) -> RecommendationDraft {
        RecommendationDraft {
            tier: SeverityTier::High,
            category: RecommendationCategory::Lighting,
            title: "Motion sensors".to_string(),
            description: "Lights stay on in empty areas".to_string(),
            savings_estimate: savings,
            confidence,
            status,
            created_at: at(0),
        }
    }

    #[test]
    fn test_ids_are_monotonic_even_with_identical_timestamps() {
        let mut registry = AlertRegistry::new();
        let ids: Vec<RecordId> = (0..5)
            .map(|_| registry.add(draft(Severity::Info, "same instant", 0)).id)
            .collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(2), RecordId(3), RecordId(4), RecordId(5)]);

        registry.remove(RecordId(5)).unwrap();
        assert_eq!(registry.add(draft(Severity::Info, "after removal", 0)).id, RecordId(6));
    }

    #[test]
    fn test_query_sorts_newest_first_with_insertion_tiebreak() {
        let mut registry = AlertRegistry::new();
        registry.add(draft(Severity::Info, "old", 60));
        registry.add(draft(Severity::Info, "tie-first", 5));
        registry.add(draft(Severity::Info, "newest", 1));
        registry.add(draft(Severity::Info, "tie-second", 5));

        let titles: Vec<&str> = registry
            .query(&AlertQuery::default())
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["newest", "tie-first", "tie-second", "old"]);
    }

    #[test]
    fn test_mark_read_hides_from_unread_view() {
        let mut registry = AlertRegistry::new();
        let id = registry.add(draft(Severity::Warning, "HVAC irregular", 3)).id;
        registry.add(draft(Severity::Info, "Firmware", 2));

        assert_eq!(registry.query(&AlertQuery::view(AlertView::Unread)).len(), 2);
        registry.mark_read(id).unwrap();
        registry.mark_read(id).unwrap();

        let unread = registry.query(&AlertQuery::view(AlertView::Unread));
        assert!(unread.iter().all(|a| a.id != id));
        assert_eq!(unread.len(), 1);
    }

    #[test]
    fn test_archive_moves_alert_to_archived_view() {
        let mut registry = AlertRegistry::new();
        let id = registry.add(draft(Severity::Critical, "Comms failure", 3)).id;

        registry.archive(id).unwrap();
        registry.archive(id).unwrap();
        // Archived alerts accept further mark_read calls without effect.
        assert!(!registry.mark_read(id).unwrap().is_read);

        assert!(registry.query(&AlertQuery::default()).is_empty());
        assert!(registry.query(&AlertQuery::view(AlertView::Unread)).is_empty());
        assert!(registry.query(&AlertQuery::view(AlertView::Critical)).is_empty());
        let archived = registry.query(&AlertQuery::view(AlertView::Archived));
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, id);
    }

    #[test]
    fn test_remove_is_terminal() {
        let mut registry = AlertRegistry::new();
        let id = registry.add(draft(Severity::Info, "gone", 3)).id;
        registry.archive(id).unwrap();
        registry.remove(id).unwrap();

        assert_eq!(registry.remove(id).unwrap_err(), DashboardError::NotFound(id));
        assert_eq!(registry.mark_read(id).unwrap_err(), DashboardError::NotFound(id));
        assert!(registry.query(&AlertQuery::view(AlertView::Archived)).is_empty());
    }

    #[test]
    fn test_query_filters_category_city_and_search() {
        let mut registry = AlertRegistry::new();
        let mut lima = draft(Severity::Critical, "Night baseline high", 1);
        lima.city = Some("lima".to_string());
        lima.category = AlertCategory::Efficiency;
        registry.add(lima);

        let mut arequipa = draft(Severity::Warning, "HVAC pattern", 2);
        arequipa.city = Some("arequipa".to_string());
        arequipa.category = AlertCategory::Devices;
        registry.add(arequipa);

        registry.add(draft(Severity::Info, "Monthly report ready", 3));

        let query = AlertQuery {
            city: CitySelection::City("lima".to_string()),
            ..AlertQuery::default()
        };
        let titles: Vec<&str> = registry.query(&query).iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Night baseline high", "Monthly report ready"]);

        let query = AlertQuery {
            category: Some(AlertCategory::Devices),
            ..AlertQuery::default()
        };
        assert_eq!(registry.query(&query).len(), 1);

        let query = AlertQuery {
            search: Some("REPORT".to_string()),
            ..AlertQuery::default()
        };
        assert_eq!(registry.query(&query)[0].title, "Monthly report ready");

        assert_eq!(registry.query(&AlertQuery::view(AlertView::Critical)).len(), 1);
    }

    #[test]
    fn test_counts() {
        let mut registry = AlertRegistry::new();
        let a = registry.add(draft(Severity::Critical, "a", 1)).id;
        let b = registry.add(draft(Severity::Warning, "b", 1)).id;
        registry.add(draft(Severity::Critical, "c", 1));
        registry.mark_read(a).unwrap();
        registry.archive(b).unwrap();

        let counts = registry.counts();
        assert_eq!(counts, AlertCounts { total: 3, unread: 1, critical: 2, archived: 1 });
    }

    #[test]
    fn test_sweep_removes_only_expired_auto_resolving_alerts() {
        let mut registry = AlertRegistry::new();
        let mut expired = draft(Severity::Success, "Goal reached", 5);
        expired.auto_resolve = true;
        let expired_id = registry.add(expired).id;

        let mut fresh = draft(Severity::Success, "Goal reached again", 1);
        fresh.auto_resolve = true;
        registry.add(fresh);
        registry.add(draft(Severity::Critical, "Keep me", 30));

        let removed = registry.sweep_resolved(at(0), Duration::minutes(2));
        assert_eq!(removed, vec![expired_id]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_trim_simulated_keeps_newest() {
        let mut registry = AlertRegistry::new();
        let manual = registry.add(draft(Severity::Info, "manual", 100)).id;
        for minutes_ago in [40, 30, 20, 10] {
            let mut d = draft(Severity::Warning, "simulated", minutes_ago);
            d.simulated = true;
            registry.add(d);
        }

        let evicted = registry.trim_simulated(2);
        assert_eq!(evicted, vec![RecordId(3), RecordId(2)]);
        assert_eq!(registry.len(), 3);
        assert!(registry.get(manual).is_ok());
    }

    #[test]
    fn test_advance_status_is_forward_only() {
        let mut registry = RecommendationRegistry::new();
        let id = registry.add(recommendation(RecommendationStatus::Pending, 960.0, 87)).id;

        assert_eq!(registry.advance_status(id).unwrap().status, RecommendationStatus::Implementing);
        assert_eq!(registry.advance_status(id).unwrap().status, RecommendationStatus::Completed);
        assert_eq!(
            registry.advance_status(id).unwrap_err(),
            DashboardError::InvalidTransition { from: RecommendationStatus::Completed }
        );
        assert_eq!(registry.get(id).unwrap().status, RecommendationStatus::Completed);
        assert_eq!(registry.advance_status(RecordId(99)).unwrap_err(), DashboardError::NotFound(RecordId(99)));
    }

    #[test]
    fn test_recommendation_query_and_summary() {
        let mut registry = RecommendationRegistry::new();
        registry.add(recommendation(RecommendationStatus::Pending, 1250.0, 94));
        registry.add(recommendation(RecommendationStatus::Implementing, 520.0, 76));
        registry.add(recommendation(RecommendationStatus::Completed, 340.0, 82));

        let pending = registry.query(&RecommendationQuery {
            status: Some(RecommendationStatus::Pending),
            category: None,
        });
        assert_eq!(pending.len(), 1);

        let hvac = registry.query(&RecommendationQuery {
            status: None,
            category: Some(RecommendationCategory::Hvac),
        });
        assert!(hvac.is_empty());

        let summary = registry.summary();
        assert_eq!((summary.pending, summary.implementing, summary.completed), (1, 1, 1));
        assert_eq!(summary.open_savings, 1770.0);
        assert!((summary.average_confidence - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_alert_view_parsing() {
        assert_eq!("Unread".parse::<AlertView>().unwrap(), AlertView::Unread);
        assert!("starred".parse::<AlertView>().is_err());
    }
}

// City service - Use case for listing cities and summarising a selection
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::city::{City, CitySelection, CityStatus};
use crate::domain::error::DashboardError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct CitySummary {
    pub selection: CitySelection,
    pub consumption: f64,
    pub cost: f64,
    pub co2: f64,
    pub status: CityStatus,
}

#[derive(Clone)]
pub struct CityService {
    repository: Arc<dyn TelemetryRepository>,
}

impl CityService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, DashboardError> {
        self.repository.list_cities().await
    }

    /// Sums the selected cities; the status is the most severe among them.
    pub async fn summary(&self, selection: &CitySelection) -> Result<CitySummary, DashboardError> {
        let cities = self.repository.list_cities().await?;
        let selected: Vec<&City> = cities
            .iter()
            .filter(|c| selection.matches(Some(&c.id)))
            .collect();
        if let (CitySelection::City(id), true) = (selection, selected.is_empty()) {
            return Err(DashboardError::UnknownCity(id.clone()));
        }

        let status = selected
            .iter()
            .map(|c| c.status)
            .max_by_key(|s| match s {
                CityStatus::Normal => 0,
                CityStatus::Alert => 1,
                CityStatus::Critical => 2,
            })
            .unwrap_or(CityStatus::Normal);

        Ok(CitySummary {
            selection: selection.clone(),
            consumption: selected.iter().map(|c| c.consumption).sum(),
            cost: selected.iter().map(|c| c.cost).sum(),
            co2: selected.iter().map(|c| c.co2).sum(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{TariffSettings, WidgetsConfig};
    use crate::infrastructure::synthetic_repository::SyntheticRepository;

    fn service() -> CityService {
        let repository = SyntheticRepository::new(WidgetsConfig::default(), TariffSettings::default(), 42);
        CityService::new(Arc::new(repository))
    }

    #[tokio::test]
    async fn test_all_sums_every_city() {
        let summary = service().summary(&CitySelection::All).await.unwrap();
        assert!((summary.consumption - 38.22).abs() < 1e-9);
        assert!((summary.cost - 6615.80).abs() < 1e-6);
        assert_eq!(summary.status, CityStatus::Normal);
    }

    #[tokio::test]
    async fn test_single_city_summary() {
        let summary = service()
            .summary(&CitySelection::City("arequipa".to_string()))
            .await
            .unwrap();
        assert_eq!(summary.consumption, 10.23);
    }

    #[tokio::test]
    async fn test_list_cities() {
        assert_eq!(service().list_cities().await.unwrap().len(), 3);
    }
}

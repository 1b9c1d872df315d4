// City catalog and the session-wide city selection
use crate::domain::error::DashboardError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ids accepted by [`CitySelection::parse`].
pub const CITY_IDS: [&str; 3] = ["lima", "arequipa", "trujillo"];

const ALL_ALIASES: [&str; 2] = ["todas", "all"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CityStatus {
    Normal,
    Alert,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub consumption: f64,
    pub cost: f64,
    pub co2: f64,
    pub status: CityStatus,
}

/// Either one allow-listed city or every city aggregated by summation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CitySelection {
    #[default]
    All,
    City(String),
}

impl CitySelection {
    pub fn parse(id: &str) -> Result<Self, DashboardError> {
        let id = id.trim().to_lowercase();
        if ALL_ALIASES.contains(&id.as_str()) {
            return Ok(CitySelection::All);
        }
        if CITY_IDS.contains(&id.as_str()) {
            return Ok(CitySelection::City(id));
        }
        Err(DashboardError::UnknownCity(id))
    }

    /// Records without a city are visible under every selection.
    pub fn matches(&self, city: Option<&str>) -> bool {
        match (self, city) {
            (CitySelection::All, _) | (_, None) => true,
            (CitySelection::City(selected), Some(city)) => selected == city,
        }
    }

    pub fn city_ids(&self) -> Vec<&str> {
        match self {
            CitySelection::All => CITY_IDS.to_vec(),
            CitySelection::City(id) => vec![id.as_str()],
        }
    }
}

impl fmt::Display for CitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitySelection::All => f.write_str("todas"),
            CitySelection::City(id) => f.write_str(id),
        }
    }
}

impl FromStr for CitySelection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CitySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Metered device domain model
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Hvac,
    Lighting,
    Security,
    Sensor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub location: String,
    pub status: DeviceStatus,
    pub consumption_kw: f64,
    /// Reading restored when an offline device is switched back on.
    #[serde(skip)]
    pub resume_kw: f64,
}

impl Device {
    pub fn new(
        id: &str,
        name: &str,
        device_type: DeviceType,
        location: &str,
        status: DeviceStatus,
        consumption_kw: f64,
    ) -> Self {
        let consumption_kw = consumption_kw.max(0.0);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            device_type,
            location: location.to_string(),
            status,
            consumption_kw: if status == DeviceStatus::Offline { 0.0 } else { consumption_kw },
            resume_kw: consumption_kw,
        }
    }

    /// Online devices switch off and report 0 kW; anything else switches on.
    pub fn toggle(&mut self) -> DeviceStatus {
        match self.status {
            DeviceStatus::Online => {
                self.resume_kw = self.consumption_kw;
                self.consumption_kw = 0.0;
                self.status = DeviceStatus::Offline;
            }
            DeviceStatus::Offline => {
                self.consumption_kw = self.resume_kw;
                self.status = DeviceStatus::Online;
            }
            DeviceStatus::Warning => {
                self.status = DeviceStatus::Online;
            }
        }
        self.status
    }

    /// Applies one random-walk step. Only online devices move.
    pub fn drift(&mut self, step_kw: f64) {
        if self.status == DeviceStatus::Online {
            self.consumption_kw = (self.consumption_kw + step_kw).max(0.0);
        }
    }
}

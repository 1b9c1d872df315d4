// Device fleet state: toggling and bounded random-walk drift
use crate::domain::device::{Device, DeviceStatus};
use crate::domain::error::DashboardError;
use rand::Rng;
use serde::Serialize;

/// Largest per-tick consumption step for an online device, in kW.
pub const DRIFT_BOUND_KW: f64 = 0.1;

#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub devices: Vec<Device>,
    pub online: usize,
    pub total_consumption_kw: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceFleet {
    devices: Vec<Device>,
}

impl DeviceFleet {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn toggle(&mut self, id: &str) -> Result<&Device, DashboardError> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DashboardError::UnknownDevice(id.to_string()))?;
        let status = device.toggle();
        tracing::debug!("Device {} toggled to {:?}", id, status);
        Ok(&*device)
    }

    pub fn drift<R: Rng>(&mut self, rng: &mut R) {
        for device in &mut self.devices {
            let step = rng.gen_range(-DRIFT_BOUND_KW..=DRIFT_BOUND_KW);
            device.drift(step);
        }
    }

    pub fn online_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.status == DeviceStatus::Online)
            .count()
    }

    pub fn total_consumption_kw(&self) -> f64 {
        self.devices.iter().map(|d| d.consumption_kw).sum()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            devices: self.devices.clone(),
            online: self.online_count(),
            total_consumption_kw: self.total_consumption_kw(),
        }
    }
}

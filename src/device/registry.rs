//! Tracks the health monitor of every active device.
//!
//! Keyed by device id. Replacing or removing an entry stops the old
//! monitor's schedule so a device never has two timers running.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::health::HealthMonitor;

#[derive(Default)]
pub struct MonitorRegistry {
    monitors: DashMap<String, Arc<HealthMonitor>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device's monitor and start its schedule. An existing
    /// monitor under the same id is stopped and replaced.
    pub fn activate(&self, device_id: &str, monitor: Arc<HealthMonitor>) {
        monitor.start();
        if let Some(previous) = self.monitors.insert(device_id.to_string(), monitor) {
            debug!(device_id, "replacing existing health monitor");
            previous.stop();
        }
    }

    /// Remove a device's monitor and stop its schedule.
    pub fn deactivate(&self, device_id: &str) {
        if let Some((_, monitor)) = self.monitors.remove(device_id) {
            monitor.stop();
        }
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<HealthMonitor>> {
        self.monitors.get(device_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

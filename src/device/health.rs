//! Periodic connectivity checks.
//!
//! A [`HealthMonitor`] probes its device every five minutes and pushes the
//! result to the connectivity sink. At most one check runs at a time: a
//! period that fires while the previous probe is still in flight is
//! skipped, never queued. The schedule restarts cleanly on
//! [`HealthMonitor::start`] and dies with [`HealthMonitor::stop`] or when
//! the monitor is dropped by the registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::platform::{ConnectivitySink, DeviceRef, SettingsSource, format_last_connected};
use crate::ssh::executor::SshExecutor;

pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct HealthMonitor {
    device: DeviceRef,
    executor: Arc<dyn SshExecutor>,
    settings: Arc<dyn SettingsSource>,
    connectivity: Arc<dyn ConnectivitySink>,
    interval: Duration,
    checking: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
}

/// Clears the in-flight flag on every exit path of a check.
struct CheckingGuard<'a>(&'a AtomicBool);

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl HealthMonitor {
    pub fn new(
        device: DeviceRef,
        executor: Arc<dyn SshExecutor>,
        settings: Arc<dyn SettingsSource>,
        connectivity: Arc<dyn ConnectivitySink>,
    ) -> Self {
        Self::with_interval(device, executor, settings, connectivity, HEALTH_CHECK_INTERVAL)
    }

    /// Same monitor with a custom period. Used by tests to shrink the
    /// five-minute schedule.
    pub fn with_interval(
        device: DeviceRef,
        executor: Arc<dyn SshExecutor>,
        settings: Arc<dyn SettingsSource>,
        connectivity: Arc<dyn ConnectivitySink>,
        interval: Duration,
    ) -> Self {
        Self {
            device,
            executor,
            settings,
            connectivity,
            interval,
            checking: AtomicBool::new(false),
            cancel: Mutex::new(None),
        }
    }

    /// Whether a check is currently in flight.
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::SeqCst)
    }

    /// Start the periodic schedule: one check immediately, then one per
    /// interval. Calling this again replaces any schedule already running.
    pub fn start(self: &Arc<Self>) {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(token.clone())
        {
            previous.cancel();
        }

        info!(
            device = %self.device.name,
            interval_secs = self.interval.as_secs(),
            "health check scheduled"
        );

        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                monitor.check_now().await;
                tokio::select! {
                    _ = tokio::time::sleep(monitor.interval) => {}
                    _ = token.cancelled() => {
                        debug!(device = %monitor.device.name, "health check stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Cancel the periodic schedule. A check already in flight finishes.
    pub fn stop(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            token.cancel();
        }
    }

    /// Run one check now, unless one is already in flight.
    pub async fn check_now(&self) {
        if self
            .checking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(device = %self.device.name, "health check already running, skipping");
            return;
        }
        let _guard = CheckingGuard(&self.checking);

        let config = crate::platform::parse_server_config(&self.device.name, &self.settings.load());
        if let Err(e) = config.validate() {
            warn!(device = %self.device.name, "health check skipped, settings invalid: {e}");
            self.connectivity.set_connectivity(&self.device, false).await;
            return;
        }

        match self.executor.probe(&config).await {
            Ok(()) => {
                debug!(device = %self.device.name, "health check succeeded");
                self.connectivity.set_connectivity(&self.device, true).await;
                self.connectivity
                    .set_last_connected(&self.device, format_last_connected(Local::now()))
                    .await;
            }
            Err(e) => {
                warn!(device = %self.device.name, "health check failed: {e}");
                self.connectivity.set_connectivity(&self.device, false).await;
            }
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Host-platform collaborators.
//!
//! The device layer reports connectivity, fires automation cards, localizes
//! messages and reads stored settings through these traits; the embedding
//! application provides the implementations. Tests substitute recording
//! doubles.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};

/// Identity of a managed device as the platform knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    pub id: String,
    pub name: String,
}

/// Message localization. `params` are named placeholders substituted into
/// the localized template.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Receives connectivity transitions and the last-seen timestamp.
#[async_trait]
pub trait ConnectivitySink: Send + Sync {
    async fn set_connectivity(&self, device: &DeviceRef, connected: bool);

    /// Called alongside a successful check with the formatted timestamp of
    /// that check.
    async fn set_last_connected(&self, device: &DeviceRef, formatted: String);
}

/// Fires automation flow cards with their token payloads.
#[async_trait]
pub trait FlowTrigger: Send + Sync {
    async fn trigger(&self, device: &DeviceRef, card_id: &str, tokens: Value);

    /// Application-wide cards that are not bound to a single device.
    async fn trigger_global(&self, card_id: &str, tokens: Value);
}

/// Persisted device settings as a flat key -> value record.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Map<String, Value>;
}

/// Timestamp format shown in the device UI for the last successful check.
pub fn format_last_connected(at: DateTime<Local>) -> String {
    at.format("%-d.%-m.%Y - %H:%M:%S").to_string()
}

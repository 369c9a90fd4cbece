//! Recording doubles for the platform collaborators and a scripted
//! transport, shared by the device layer tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::platform::{ConnectivitySink, DeviceRef, FlowTrigger, SettingsSource, Translate};
use crate::ssh::client::CommandResult;
use crate::ssh::config::ServerConfig;
use crate::ssh::error::ConnectionError;
use crate::ssh::executor::SshExecutor;

/// Route tracing output through the test harness. Honors `RUST_LOG`; safe
/// to call from every test, only the first call installs the subscriber.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Renders "key" or "key name=value ..." so tests can assert the exact key
/// and parameters a message was built from.
pub(crate) struct EchoTranslator;

impl Translate for EchoTranslator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut out = key.to_string();
        for (name, value) in params {
            out.push_str(&format!(" {name}={value}"));
        }
        out
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    pub connectivity: Mutex<Vec<bool>>,
    pub last_connected: Mutex<Vec<String>>,
}

#[async_trait]
impl ConnectivitySink for RecordingSink {
    async fn set_connectivity(&self, _device: &DeviceRef, connected: bool) {
        self.connectivity.lock().unwrap().push(connected);
    }

    async fn set_last_connected(&self, _device: &DeviceRef, formatted: String) {
        self.last_connected.lock().unwrap().push(formatted);
    }
}

#[derive(Default)]
pub(crate) struct RecordingTrigger {
    pub device_cards: Mutex<Vec<(String, Value)>>,
    pub global_cards: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl FlowTrigger for RecordingTrigger {
    async fn trigger(&self, _device: &DeviceRef, card_id: &str, tokens: Value) {
        self.device_cards
            .lock()
            .unwrap()
            .push((card_id.to_string(), tokens));
    }

    async fn trigger_global(&self, card_id: &str, tokens: Value) {
        self.global_cards
            .lock()
            .unwrap()
            .push((card_id.to_string(), tokens));
    }
}

pub(crate) struct FixedSettings(pub Map<String, Value>);

impl SettingsSource for FixedSettings {
    fn load(&self) -> Map<String, Value> {
        self.0.clone()
    }
}

/// A valid password-auth settings record.
pub(crate) fn settings_record() -> Map<String, Value> {
    json!({
        "host": "192.168.1.10",
        "port": 22,
        "username": "admin",
        "password": "secret"
    })
    .as_object()
    .cloned()
    .unwrap()
}

pub(crate) fn device() -> DeviceRef {
    DeviceRef {
        id: "dev-1".to_string(),
        name: "nas".to_string(),
    }
}

/// Transport double that replays queued results. An empty queue yields a
/// clean success so tests only script what they care about.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    pub probe_results: Mutex<VecDeque<Result<(), ConnectionError>>>,
    pub execute_results: Mutex<VecDeque<Result<CommandResult, ConnectionError>>>,
    pub probe_delay: Option<Duration>,
    pub probe_calls: AtomicUsize,
    pub execute_calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn with_probe_results(
        results: impl IntoIterator<Item = Result<(), ConnectionError>>,
    ) -> Self {
        Self {
            probe_results: Mutex::new(results.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_execute_results(
        results: impl IntoIterator<Item = Result<CommandResult, ConnectionError>>,
    ) -> Self {
        Self {
            execute_results: Mutex::new(results.into_iter().collect()),
            ..Self::default()
        }
    }
}

pub(crate) fn clean_exit(stdout: &str) -> CommandResult {
    CommandResult {
        stdout: stdout.to_string(),
        stderr: String::new(),
        code: Some(0),
        signal: None,
    }
}

#[async_trait]
impl SshExecutor for ScriptedExecutor {
    async fn probe(&self, _config: &ServerConfig) -> Result<(), ConnectionError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        self.probe_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn execute(
        &self,
        _config: &ServerConfig,
        _command: &str,
    ) -> Result<CommandResult, ConnectionError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.execute_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(clean_exit("")))
    }
}

//! Setup-time validation and connection testing.
//!
//! During pairing the user gets a single localized message back: the first
//! validation problem, or the result of a live connection test. Field names
//! inside validation messages are localized too, through their own keys.

use tracing::info;

use crate::platform::Translate;
use crate::ssh::config::{ServerConfig, ValidationError};
use crate::ssh::error::keys;
use crate::ssh::executor::SshExecutor;

/// Localization keys for the validation messages and field labels.
pub mod labels {
    /// Takes an `input` parameter naming the field.
    pub const REQUIRED: &str = "setup.validation.required";
    /// Takes an `input` parameter naming the field.
    pub const INVALID_PORT: &str = "setup.validation.port";

    pub const NAME: &str = "setup.name";
    pub const ADDRESS: &str = "setup.address";
    pub const PORT: &str = "setup.port";
    pub const USERNAME: &str = "setup.username";
    pub const PASSWORD: &str = "setup.password";
    pub const KEY: &str = "setup.key";
}

fn field_label_key(field: &str) -> &'static str {
    match field {
        "name" => labels::NAME,
        "host" => labels::ADDRESS,
        "username" => labels::USERNAME,
        "password" => labels::PASSWORD,
        "privateKey" => labels::KEY,
        _ => labels::NAME,
    }
}

/// The localized message for the first validation problem, or `None` when
/// the configuration is usable.
pub fn validation_message(config: &ServerConfig, translator: &dyn Translate) -> Option<String> {
    let err = config.validate().err()?;
    let message = match err {
        ValidationError::MissingField(field) => {
            let label = translator.translate(field_label_key(field), &[]);
            translator.translate(labels::REQUIRED, &[("input", &label)])
        }
        ValidationError::InvalidPort(_) => {
            let label = translator.translate(labels::PORT, &[]);
            translator.translate(labels::INVALID_PORT, &[("input", &label)])
        }
    };
    Some(message)
}

/// Validate and live-test a candidate configuration, returning one localized
/// message either way. This is the "check connection" button during setup.
pub async fn check_connection(
    config: &ServerConfig,
    executor: &dyn SshExecutor,
    translator: &dyn Translate,
) -> Result<String, String> {
    if let Some(message) = validation_message(config, translator) {
        return Err(message);
    }

    match executor.probe(config).await {
        Ok(()) => {
            info!(host = %config.host, "connection test succeeded");
            Ok(translator.translate(keys::CONNECTION_SUCCESS, &[]))
        }
        Err(err) => {
            info!(host = %config.host, "connection test failed: {err}");
            Err(err.localized(translator))
        }
    }
}

/// Pairing identity for a configured server: stable-enough unique id derived
/// from the host and the pairing instant.
pub fn device_id(config: &ServerConfig) -> String {
    format!(
        "ssh-server-{}-{}",
        config.host,
        chrono::Utc::now().timestamp_millis()
    )
}

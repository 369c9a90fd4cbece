//! Transport seam for the device layer.
//!
//! Health monitoring and command dispatch never talk to russh directly; they
//! go through [`SshExecutor`] so tests can substitute a scripted transport.
//! The production implementation builds a fresh one-shot client per call.

use async_trait::async_trait;

use super::client::{CommandResult, SshClient};
use super::config::{ServerConfig, TransportConfig};
use super::error::ConnectionError;

#[async_trait]
pub trait SshExecutor: Send + Sync {
    /// Connectivity probe: connect, authenticate, run a trivial command.
    async fn probe(&self, config: &ServerConfig) -> Result<(), ConnectionError>;

    /// Run one remote command to completion.
    async fn execute(
        &self,
        config: &ServerConfig,
        command: &str,
    ) -> Result<CommandResult, ConnectionError>;
}

/// Production executor: one connection per operation, nothing cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct OneShotExecutor;

#[async_trait]
impl SshExecutor for OneShotExecutor {
    async fn probe(&self, config: &ServerConfig) -> Result<(), ConnectionError> {
        SshClient::new(TransportConfig::from_server(config)).probe().await
    }

    async fn execute(
        &self,
        config: &ServerConfig,
        command: &str,
    ) -> Result<CommandResult, ConnectionError> {
        SshClient::new(TransportConfig::from_server(config))
            .execute(command)
            .await
    }
}

//! One-shot SSH client.
//!
//! An [`SshClient`] wraps exactly one connection attempt: connect with the
//! transport timeout, verify the session is actually connected, run one
//! command (or the liveness probe), then disconnect. Instances are created
//! per operation and discarded afterwards; there is no pooling or reuse.
//! Pooling would reintroduce stale-session and multiplexing hazards this
//! design deliberately avoids, given how rarely automation flows fire.
//!
//! The connection is released on every exit path after a successful connect;
//! raw failures are classified into [`ConnectionError`] (see
//! [`crate::ssh::error`]).

use russh::{ChannelMsg, Disconnect, client};
use serde::Serialize;
use tracing::{debug, warn};

use super::auth::strategy_for;
use super::config::TransportConfig;
use super::error::{ConnectionError, classify};
use super::session::SshClientHandler;

/// Trivial identity command used by the liveness probe to confirm the
/// channel is usable end-to-end.
const PROBE_COMMAND: &str = "whoami";

/// Output of a completed remote command.
///
/// `code` is `None` exactly when the remote side reported termination by
/// signal instead of an exit status. Whatever the transport reports is
/// preserved; a code is never invented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
    pub signal: Option<String>,
}

/// A single connect -> operate -> disconnect cycle.
pub struct SshClient {
    transport: TransportConfig,
}

impl SshClient {
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }

    /// Liveness probe: connect, authenticate, run a trivial identity command
    /// end-to-end, disconnect. Returns no output; success is the result.
    pub async fn probe(&self) -> Result<(), ConnectionError> {
        let handle = self.connect().await?;
        let result = self.run_command(&handle, PROBE_COMMAND).await;
        disconnect(&handle).await;
        result.map(|_| ())
    }

    /// Run `command` to completion, capturing stdout, stderr and exit
    /// status, then disconnect.
    pub async fn execute(&self, command: &str) -> Result<CommandResult, ConnectionError> {
        let handle = self.connect().await?;
        let result = self.run_command(&handle, command).await;
        disconnect(&handle).await;
        result
    }

    /// Establish the connection and authenticate with the configured method.
    async fn connect(&self) -> Result<client::Handle<SshClientHandler>, ConnectionError> {
        let config = self.transport.client_config();
        let target = (self.transport.host.as_str(), self.transport.port);

        debug!(
            host = %self.transport.host,
            port = self.transport.port,
            "connecting"
        );

        let connect_future = client::connect(config, target, SshClientHandler);
        let mut handle = tokio::time::timeout(self.transport.timeout, connect_future)
            .await
            .map_err(|_| ConnectionError::UnreachableHost)?
            .map_err(classify)?;

        let strategy = strategy_for(&self.transport.auth);
        debug!(strategy = strategy.name(), "authenticating");
        let authenticated = strategy
            .authenticate(&mut handle, &self.transport.username)
            .await?;
        if !authenticated {
            return Err(ConnectionError::AuthenticationFailed);
        }

        // The server can drop the session right after a nominally successful
        // handshake; surface that as a plain connection failure.
        if handle.is_closed() {
            return Err(ConnectionError::ConnectionFailed);
        }

        Ok(handle)
    }

    /// Open a session channel, execute the command, and collect the output.
    /// A hang beyond the transport timeout classifies as a timeout failure.
    async fn run_command(
        &self,
        handle: &client::Handle<SshClientHandler>,
        command: &str,
    ) -> Result<CommandResult, ConnectionError> {
        let mut channel = handle.channel_open_session().await.map_err(classify)?;

        channel.exec(true, command).await.map_err(classify)?;

        let mut stdout = Vec::with_capacity(4096);
        let mut stderr = Vec::with_capacity(1024);
        let mut code: Option<i32> = None;
        let mut signal: Option<String> = None;

        let collected = tokio::time::timeout(self.transport.timeout, async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => {
                        stdout.extend_from_slice(&data);
                    }
                    Some(ChannelMsg::ExtendedData { data, ext }) => {
                        // ext == 1 is stderr in SSH protocol
                        if ext == 1 {
                            stderr.extend_from_slice(&data);
                        }
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        code = Some(exit_code(exit_status));
                    }
                    Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                        signal = Some(signal_label(&signal_name));
                    }
                    Some(ChannelMsg::Eof) => {
                        // Keep waiting for the exit report if it has not
                        // arrived yet
                        if code.is_some() || signal.is_some() {
                            break;
                        }
                    }
                    Some(ChannelMsg::Close) => {
                        break;
                    }
                    Some(_) => {
                        // Ignore other message types
                    }
                    None => {
                        // Channel closed
                        break;
                    }
                }
            }
        })
        .await;

        if collected.is_err() {
            warn!(
                command,
                timeout_ms = self.transport.timeout.as_millis() as u64,
                "command did not settle within the transport timeout"
            );
            let _ = channel.close().await;
            return Err(ConnectionError::UnreachableHost);
        }

        let _ = channel.close().await;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            code,
            signal,
        })
    }
}

/// Release the connection. Failures here are uninteresting; the session is
/// being thrown away either way.
async fn disconnect(handle: &client::Handle<SshClientHandler>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "en")
        .await
    {
        debug!("disconnect after one-shot operation failed: {e}");
    }
}

/// Exit statuses are a u32 on the wire; clamp instead of wrapping for
/// values that do not fit the signed code callers see.
fn exit_code(status: u32) -> i32 {
    i32::try_from(status).unwrap_or(i32::MAX)
}

/// Conventional name of an exit signal as automation tokens expect it
/// ("TERM", "KILL", ...).
fn signal_label(sig: &russh::Sig) -> String {
    match sig {
        russh::Sig::Custom(name) => name.clone(),
        other => format!("{other:?}"),
    }
}

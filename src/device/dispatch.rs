//! Command dispatch for flow action cards.
//!
//! Two entry points over the same execution path: [`CommandDispatcher::run_sync`]
//! returns the outcome (or error) to the calling flow, while
//! [`CommandDispatcher::run_async`] detaches, lets the flow continue
//! immediately, and reports completion through the async trigger cards.
//!
//! Every failure, sync or async, also fires the application-wide error card
//! so users can build a single "anything failed" flow. A command that the
//! remote shell ran but that exited non-zero is a failure here, not a
//! success with a bad code.

use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::platform::flow::{
    ASYNC_COMMAND_FAILED, ASYNC_COMMAND_SUCCESS, CommandFailureTokens, CommandSuccessTokens,
    GLOBAL_COMMAND_FAILED, GlobalFailureTokens, NO_EXIT_CODE,
};
use crate::platform::{
    ConnectivitySink, DeviceRef, FlowTrigger, SettingsSource, Translate, format_last_connected,
    parse_server_config,
};
use crate::ssh::client::CommandResult;
use crate::ssh::config::{ServerConfig, ValidationError};
use crate::ssh::error::ConnectionError;
use crate::ssh::executor::SshExecutor;

/// Localization key for the non-zero-exit failure message. Takes `code` and
/// `stderr` parameters.
pub const COMMAND_FAILED_KEY: &str = "setup.command.failed";

/// Successful command outcome as handed to flow tokens.
///
/// `signal` is empty unless the remote side reported one; `code` is the
/// remote exit status, or [`NO_EXIT_CODE`] when only a signal was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub stdout: String,
    pub stderr: String,
    pub signal: String,
    pub code: i64,
}

impl From<CommandResult> for CommandOutcome {
    fn from(result: CommandResult) -> Self {
        Self {
            stdout: result.stdout,
            stderr: result.stderr,
            signal: result.signal.unwrap_or_default(),
            code: result.code.map(i64::from).unwrap_or(NO_EXIT_CODE),
        }
    }
}

/// Why a dispatched command did not produce a [`CommandOutcome`]. The
/// `message` fields are already localized for flow tokens and card errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The stored settings do not form a usable configuration. Nothing was
    /// executed and no cards fire for this.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The command ran and exited non-zero.
    #[error("{message}")]
    CommandFailed {
        code: i32,
        stderr: String,
        message: String,
    },
    /// The command never ran because the connection or channel failed.
    #[error("{message}")]
    Connection {
        source: ConnectionError,
        message: String,
    },
}

/// Executes flow commands against one device and reports the results to the
/// platform. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct CommandDispatcher {
    device: DeviceRef,
    executor: Arc<dyn SshExecutor>,
    settings: Arc<dyn SettingsSource>,
    translator: Arc<dyn Translate>,
    connectivity: Arc<dyn ConnectivitySink>,
    flow: Arc<dyn FlowTrigger>,
}

impl CommandDispatcher {
    pub fn new(
        device: DeviceRef,
        executor: Arc<dyn SshExecutor>,
        settings: Arc<dyn SettingsSource>,
        translator: Arc<dyn Translate>,
        connectivity: Arc<dyn ConnectivitySink>,
        flow: Arc<dyn FlowTrigger>,
    ) -> Self {
        Self {
            device,
            executor,
            settings,
            translator,
            connectivity,
            flow,
        }
    }

    /// Run a command and return its outcome to the calling flow. The flow
    /// blocks until the command settles.
    pub async fn run_sync(&self, command: &str) -> Result<CommandOutcome, DispatchError> {
        debug!(device = %self.device.name, command, "executing sync command");
        self.execute(command).await
    }

    /// Detach a command. The returned handle is for tests and shutdown;
    /// completion is reported exclusively through the async trigger cards,
    /// and a failure never propagates back to the launching flow.
    pub fn run_async(&self, command: String) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            debug!(device = %dispatcher.device.name, command, "executing async command");
            match dispatcher.execute(&command).await {
                Ok(outcome) => {
                    let tokens = CommandSuccessTokens {
                        command: command.clone(),
                        stdout: outcome.stdout,
                        stderr: outcome.stderr,
                        signal: outcome.signal,
                        code: outcome.code,
                    };
                    dispatcher
                        .flow
                        .trigger(&dispatcher.device, ASYNC_COMMAND_SUCCESS, to_tokens(&tokens))
                        .await;
                }
                // Nothing was attempted against the host, so no cards fire;
                // the raw validation message is not a flow-facing string
                Err(DispatchError::Validation(err)) => {
                    error!(device = %dispatcher.device.name, command, "async command not executed: {err}");
                }
                Err(err) => {
                    let tokens = CommandFailureTokens {
                        command: command.clone(),
                        errormessage: err.to_string(),
                    };
                    dispatcher
                        .flow
                        .trigger(&dispatcher.device, ASYNC_COMMAND_FAILED, to_tokens(&tokens))
                        .await;
                }
            }
        })
    }

    /// Shared execution path: load settings, validate, execute, report.
    async fn execute(&self, command: &str) -> Result<CommandOutcome, DispatchError> {
        let config = parse_server_config(&self.device.name, &self.settings.load());
        config.validate()?;

        let result = match self.executor.execute(&config, command).await {
            Ok(result) => result,
            Err(err) => {
                let message = err.localized(self.translator.as_ref());
                error!(device = %self.device.name, command, %message, "command failed");
                self.report_failure(&config, command, &message).await;
                return Err(DispatchError::Connection {
                    source: err,
                    message,
                });
            }
        };

        if let Some(code) = result.code
            && code != 0
        {
            let message = self.translator.translate(
                COMMAND_FAILED_KEY,
                &[("code", &code.to_string()), ("stderr", &result.stderr)],
            );
            error!(device = %self.device.name, command, code, "command exited non-zero");
            self.report_failure(&config, command, &message).await;
            return Err(DispatchError::CommandFailed {
                code,
                stderr: result.stderr,
                message,
            });
        }

        info!(device = %self.device.name, command, "command succeeded");
        self.report_success().await;
        Ok(CommandOutcome::from(result))
    }

    async fn report_success(&self) {
        self.connectivity.set_connectivity(&self.device, true).await;
        self.connectivity
            .set_last_connected(&self.device, format_last_connected(Local::now()))
            .await;
    }

    async fn report_failure(&self, config: &ServerConfig, command: &str, message: &str) {
        self.connectivity
            .set_connectivity(&self.device, false)
            .await;
        let tokens = GlobalFailureTokens {
            device_name: self.device.name.clone(),
            device_id: self.device.id.clone(),
            host: config.host.clone(),
            command: command.to_string(),
            errormessage: message.to_string(),
        };
        self.flow
            .trigger_global(GLOBAL_COMMAND_FAILED, to_tokens(&tokens))
            .await;
    }
}

fn to_tokens<T: Serialize>(tokens: &T) -> Value {
    serde_json::to_value(tokens).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::{
        EchoTranslator, FixedSettings, RecordingSink, RecordingTrigger, ScriptedExecutor,
        clean_exit, device, settings_record,
    };

    fn dispatcher(executor: ScriptedExecutor) -> (CommandDispatcher, Arc<RecordingSink>, Arc<RecordingTrigger>) {
        crate::device::testing::init_tracing();
        let sink = Arc::new(RecordingSink::default());
        let trigger = Arc::new(RecordingTrigger::default());
        let dispatcher = CommandDispatcher::new(
            device(),
            Arc::new(executor),
            Arc::new(FixedSettings(settings_record())),
            Arc::new(EchoTranslator),
            sink.clone(),
            trigger.clone(),
        );
        (dispatcher, sink, trigger)
    }

    mod sync_dispatch {
        use super::*;
        use crate::ssh::client::CommandResult;

        #[tokio::test]
        async fn test_success_returns_outcome_and_marks_connected() {
            let executor = ScriptedExecutor::with_execute_results([Ok(clean_exit("hello\n"))]);
            let (dispatcher, sink, trigger) = dispatcher(executor);

            let outcome = dispatcher.run_sync("echo hello").await.unwrap();
            assert_eq!(outcome.stdout, "hello\n");
            assert_eq!(outcome.code, 0);
            assert_eq!(outcome.signal, "");

            assert_eq!(*sink.connectivity.lock().unwrap(), vec![true]);
            assert_eq!(sink.last_connected.lock().unwrap().len(), 1);
            assert!(trigger.global_cards.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_a_failure_with_code_and_stderr() {
            let executor = ScriptedExecutor::with_execute_results([Ok(CommandResult {
                stdout: String::new(),
                stderr: "no such file\n".to_string(),
                code: Some(2),
                signal: None,
            })]);
            let (dispatcher, sink, trigger) = dispatcher(executor);

            let err = dispatcher.run_sync("ls /missing").await.unwrap_err();
            match err {
                DispatchError::CommandFailed {
                    code,
                    stderr,
                    message,
                } => {
                    assert_eq!(code, 2);
                    assert_eq!(stderr, "no such file\n");
                    assert_eq!(message, "setup.command.failed code=2 stderr=no such file\n");
                }
                other => panic!("expected CommandFailed, got {other:?}"),
            }

            assert_eq!(*sink.connectivity.lock().unwrap(), vec![false]);
            let globals = trigger.global_cards.lock().unwrap();
            assert_eq!(globals.len(), 1);
            assert_eq!(globals[0].0, GLOBAL_COMMAND_FAILED);
            assert_eq!(globals[0].1["device_id"], "dev-1");
            assert_eq!(globals[0].1["host"], "192.168.1.10");
        }

        #[tokio::test]
        async fn test_signal_termination_uses_sentinel_code() {
            let executor = ScriptedExecutor::with_execute_results([Ok(CommandResult {
                stdout: String::new(),
                stderr: String::new(),
                code: None,
                signal: Some("TERM".to_string()),
            })]);
            let (dispatcher, _sink, _trigger) = dispatcher(executor);

            let outcome = dispatcher.run_sync("sleep 100").await.unwrap();
            assert_eq!(outcome.code, NO_EXIT_CODE);
            assert_eq!(outcome.signal, "TERM");
        }

        #[tokio::test]
        async fn test_connection_failure_localizes_and_fires_global_card() {
            let executor = ScriptedExecutor::with_execute_results([Err(
                ConnectionError::UnreachableHost,
            )]);
            let (dispatcher, sink, trigger) = dispatcher(executor);

            let err = dispatcher.run_sync("uptime").await.unwrap_err();
            match err {
                DispatchError::Connection { source, message } => {
                    assert_eq!(source, ConnectionError::UnreachableHost);
                    assert_eq!(message, "setup.connection-test.failed-unreachable-host");
                }
                other => panic!("expected Connection, got {other:?}"),
            }

            assert_eq!(*sink.connectivity.lock().unwrap(), vec![false]);
            assert_eq!(trigger.global_cards.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_invalid_settings_reject_without_executing() {
            let sink = Arc::new(RecordingSink::default());
            let trigger = Arc::new(RecordingTrigger::default());
            let executor = Arc::new(ScriptedExecutor::default());
            let dispatcher = CommandDispatcher::new(
                device(),
                executor.clone(),
                Arc::new(FixedSettings(serde_json::Map::new())),
                Arc::new(EchoTranslator),
                sink.clone(),
                trigger.clone(),
            );

            let err = dispatcher.run_sync("uptime").await.unwrap_err();
            assert!(matches!(err, DispatchError::Validation(_)));
            assert_eq!(
                executor
                    .execute_calls
                    .load(std::sync::atomic::Ordering::SeqCst),
                0
            );
            assert!(sink.connectivity.lock().unwrap().is_empty());
            assert!(trigger.global_cards.lock().unwrap().is_empty());
        }
    }

    mod async_dispatch {
        use super::*;

        #[tokio::test]
        async fn test_success_fires_only_the_success_card() {
            let executor = ScriptedExecutor::with_execute_results([Ok(clean_exit("42\n"))]);
            let (dispatcher, _sink, trigger) = dispatcher(executor);

            dispatcher.run_async("cat answer".to_string()).await.unwrap();

            let cards = trigger.device_cards.lock().unwrap();
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].0, ASYNC_COMMAND_SUCCESS);
            assert_eq!(cards[0].1["command"], "cat answer");
            assert_eq!(cards[0].1["stdout"], "42\n");
            assert_eq!(cards[0].1["code"], 0);
            assert!(trigger.global_cards.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_failure_fires_error_card_and_global_card() {
            let executor =
                ScriptedExecutor::with_execute_results([Err(ConnectionError::AuthenticationFailed)]);
            let (dispatcher, sink, trigger) = dispatcher(executor);

            dispatcher.run_async("uptime".to_string()).await.unwrap();

            let cards = trigger.device_cards.lock().unwrap();
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].0, ASYNC_COMMAND_FAILED);
            assert_eq!(
                cards[0].1["errormessage"],
                "setup.connection-test.failed-authentication"
            );
            assert_eq!(trigger.global_cards.lock().unwrap().len(), 1);
            assert_eq!(*sink.connectivity.lock().unwrap(), vec![false]);
        }

        #[tokio::test]
        async fn test_invalid_settings_fire_no_cards() {
            let sink = Arc::new(RecordingSink::default());
            let trigger = Arc::new(RecordingTrigger::default());
            let dispatcher = CommandDispatcher::new(
                device(),
                Arc::new(ScriptedExecutor::default()),
                Arc::new(FixedSettings(serde_json::Map::new())),
                Arc::new(EchoTranslator),
                sink.clone(),
                trigger.clone(),
            );

            dispatcher.run_async("uptime".to_string()).await.unwrap();

            // Nothing executed, so neither the device cards nor the global
            // card carry the raw validation message
            assert!(trigger.device_cards.lock().unwrap().is_empty());
            assert!(trigger.global_cards.lock().unwrap().is_empty());
            assert!(sink.connectivity.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_failure_does_not_panic_the_task() {
            let executor = ScriptedExecutor::with_execute_results([Err(
                ConnectionError::Detailed("boom".to_string()),
            )]);
            let (dispatcher, _sink, _trigger) = dispatcher(executor);

            // JoinHandle resolves Ok even when the command failed
            assert!(dispatcher.run_async("false".to_string()).await.is_ok());
        }
    }
}

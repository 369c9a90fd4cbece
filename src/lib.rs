//! SSH command execution core for device automation platforms.
//!
//! The crate turns stored device settings into one-shot SSH operations and
//! reports the results back to the host platform:
//!
//! - [`ssh`]: configuration, algorithm selection, authentication and the
//!   one-shot client built on russh, plus the error classification shared
//!   by everything above it.
//! - [`device`]: the per-device behaviors, flow command dispatch, periodic
//!   health checks and pairing-time validation.
//! - [`platform`]: the traits the embedding application implements
//!   (localization, connectivity reporting, flow triggers, settings) and
//!   the flow card contracts.
//!
//! Every operation opens a fresh connection and closes it when done; there
//! is no session pool. Settings are re-read per operation, so changes take
//! effect on the next command without restarting anything.

pub mod device;
pub mod platform;
pub mod ssh;

pub use device::{CommandDispatcher, CommandOutcome, DispatchError, HealthMonitor, MonitorRegistry};
pub use platform::{ConnectivitySink, DeviceRef, FlowTrigger, SettingsSource, Translate};
pub use ssh::{CommandResult, ConnectionError, ServerConfig, SshExecutor};

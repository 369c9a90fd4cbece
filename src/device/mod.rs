//! Device lifecycle: command dispatch, health monitoring and pairing.

pub mod dispatch;
pub mod health;
pub mod pairing;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{COMMAND_FAILED_KEY, CommandDispatcher, CommandOutcome, DispatchError};
pub use health::{HEALTH_CHECK_INTERVAL, HealthMonitor};
pub use registry::MonitorRegistry;

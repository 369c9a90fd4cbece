//! SSH connectivity: configuration, algorithm negotiation, authentication,
//! one-shot command execution and the error taxonomy shared by the device
//! layer.

pub mod algorithms;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod session;

pub use client::{CommandResult, SshClient};
pub use config::{
    AuthMethod, AuthType, Credentials, ServerConfig, TransportConfig, ValidationError,
};
pub use error::ConnectionError;
pub use executor::{OneShotExecutor, SshExecutor};

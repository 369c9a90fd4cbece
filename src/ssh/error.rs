//! Connection error taxonomy.
//!
//! Raw transport failures are translated into a small stable set of error
//! kinds. Callers (pairing validation, flow error tokens) depend on
//! distinguishing "bad credentials" from "host unreachable" from "generic
//! detail" for user-facing messages, so the classification here must stay
//! stable:
//!
//! | raw condition | kind |
//! |---|---|
//! | session not connected right after the connect attempt | [`ConnectionError::ConnectionFailed`] |
//! | authentication-phase failure | [`ConnectionError::AuthenticationFailed`] |
//! | connect-phase or operation timeout | [`ConnectionError::UnreachableHost`] |
//! | socket failure with a host-unreachable code | [`ConnectionError::UnreachableHost`] |
//! | anything else | [`ConnectionError::Detailed`] with the stringified failure |
//!
//! None of these are retried automatically; every operation is one-shot.

use thiserror::Error;

use crate::platform::Translate;

/// Localization keys for the user-facing connection messages.
pub mod keys {
    pub const CONNECTION_FAILED: &str = "setup.connection-test.failed";
    pub const AUTHENTICATION_FAILED: &str = "setup.connection-test.failed-authentication";
    pub const UNREACHABLE_HOST: &str = "setup.connection-test.failed-unreachable-host";
    pub const FAILED_DETAIL: &str = "setup.connection-test.failed-detail";
    pub const CONNECTION_SUCCESS: &str = "setup.connection-test.success";
}

/// A classified transport or authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The session did not report a connected state after the connect attempt.
    #[error("connection failed")]
    ConnectionFailed,
    /// The server rejected the configured credentials.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The host did not answer within the transport timeout, or the socket
    /// reported it unreachable.
    #[error("host unreachable")]
    UnreachableHost,
    /// Any other failure, carrying the raw message.
    #[error("{0}")]
    Detailed(String),
}

impl ConnectionError {
    /// The localization key for this kind.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::ConnectionFailed => keys::CONNECTION_FAILED,
            Self::AuthenticationFailed => keys::AUTHENTICATION_FAILED,
            Self::UnreachableHost => keys::UNREACHABLE_HOST,
            Self::Detailed(_) => keys::FAILED_DETAIL,
        }
    }

    /// Render the user-facing message through the platform translator.
    pub fn localized(&self, translator: &dyn Translate) -> String {
        match self {
            Self::Detailed(detail) => {
                translator.translate(keys::FAILED_DETAIL, &[("detail", detail)])
            }
            other => translator.translate(other.message_key(), &[]),
        }
    }
}

/// Classify a russh error raised outside the authentication phase.
pub(crate) fn classify(err: russh::Error) -> ConnectionError {
    match err {
        russh::Error::ConnectionTimeout | russh::Error::InactivityTimeout => {
            ConnectionError::UnreachableHost
        }
        russh::Error::NotAuthenticated | russh::Error::NoAuthMethod => {
            ConnectionError::AuthenticationFailed
        }
        russh::Error::Disconnect => ConnectionError::ConnectionFailed,
        russh::Error::IO(io_err) => classify_io(&io_err),
        other => ConnectionError::Detailed(other.to_string()),
    }
}

/// Classify a failure raised while authenticating. Transport errors during
/// this phase are credential problems from the caller's point of view.
pub(crate) fn classify_auth(err: russh::Error) -> ConnectionError {
    match err {
        russh::Error::ConnectionTimeout | russh::Error::InactivityTimeout => {
            ConnectionError::UnreachableHost
        }
        russh::Error::IO(io_err) => classify_io(&io_err),
        _ => ConnectionError::AuthenticationFailed,
    }
}

fn classify_io(err: &std::io::Error) -> ConnectionError {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable | ErrorKind::TimedOut => {
            ConnectionError::UnreachableHost
        }
        _ => ConnectionError::Detailed(err.to_string()),
    }
}

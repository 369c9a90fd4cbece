//! Authentication strategy trait definition.

use async_trait::async_trait;
use russh::client;

use crate::ssh::error::ConnectionError;
use crate::ssh::session::SshClientHandler;

/// Trait for SSH authentication strategies.
///
/// Each strategy represents one authentication method; a connection attempt
/// uses exactly one, chosen from the transport configuration.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Attempt to authenticate with the SSH server.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Authentication succeeded
    /// * `Ok(false)` - The server rejected the credentials
    /// * `Err(_)` - Classified failure during the authentication attempt
    async fn authenticate(
        &self,
        handle: &mut client::Handle<SshClientHandler>,
        username: &str,
    ) -> Result<bool, ConnectionError>;

    /// Name of this strategy, for logging.
    fn name(&self) -> &'static str;
}

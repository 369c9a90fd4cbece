//! russh client handler.
//!
//! Automation devices are paired by address and credentials; there is no
//! known_hosts store on the platform, so the handler accepts all host keys
//! (the `StrictHostKeyChecking=no` model). Transport security for these
//! deployments comes from the credential check, not host pinning.

use russh::{client, keys};

/// Client handler that accepts all server host keys.
pub struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

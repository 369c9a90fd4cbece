//! Authentication strategies for SSH connections.
//!
//! A connection attempt authenticates with exactly one strategy, selected
//! from the transport configuration: [`PasswordAuth`] for password
//! credentials, [`KeyAuth`] for in-memory private keys.

mod key;
mod password;
mod traits;

pub use key::KeyAuth;
pub use password::PasswordAuth;
pub use traits::AuthStrategy;

use crate::ssh::config::AuthMethod;

/// Select the strategy for the configured auth method.
pub(crate) fn strategy_for(auth: &AuthMethod) -> Box<dyn AuthStrategy> {
    match auth {
        AuthMethod::Password(password) => Box::new(PasswordAuth::new(password.clone())),
        AuthMethod::PrivateKey { key, passphrase } => {
            Box::new(KeyAuth::new(key.clone(), passphrase.clone()))
        }
    }
}

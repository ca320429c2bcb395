//! Driven port for the static credential store.

use async_trait::async_trait;

use crate::domain::Username;

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential store adapters.
    pub enum CredentialRepositoryError {
        /// The store could not be consulted.
        Unavailable { message: String } => "credential store unavailable: {message}",
    }
}

/// Read-only mapping of username to stored password hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Stored password hash for `username`, or `None` for unknown users.
    async fn password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<String>, CredentialRepositoryError>;
}

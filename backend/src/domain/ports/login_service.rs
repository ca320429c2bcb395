//! Driving port for sign-in.
//!
//! Inbound adapters authenticate through this trait without knowing where
//! credentials live or how passwords are hashed.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Username};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the authenticated username.
    ///
    /// Unknown users and wrong passwords both yield
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized).
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Username, Error>;
}

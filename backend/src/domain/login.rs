//! Credential-backed implementation of the [`LoginService`] port.
//!
//! Passwords are checked with bcrypt verification on a blocking worker, never
//! by comparing strings.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use super::ports::{CredentialRepository, LoginService};
use super::{Error, LoginCredentials, Username};

/// Message shown for any failed sign-in.
pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Login service consulting a [`CredentialRepository`].
#[derive(Clone)]
pub struct CredentialLoginService {
    credentials: Arc<dyn CredentialRepository>,
}

impl CredentialLoginService {
    /// Build the service over a credential store.
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl LoginService for CredentialLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Username, Error> {
        let username = credentials.username();
        let stored = self
            .credentials
            .password_hash(username)
            .await
            .map_err(|err| {
                error!(error = %err, "credential lookup failed");
                Error::internal(format!("credential lookup failed: {err}"))
            })?;
        let Some(hash) = stored else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = credentials.password().to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            let password = zeroize::Zeroizing::new(password);
            bcrypt::verify(password.as_str(), &hash)
        })
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?;

        match verified {
            Ok(true) => Ok(username.clone()),
            Ok(false) => Err(Error::unauthorized(INVALID_CREDENTIALS)),
            Err(err) => {
                warn!(%username, error = %err, "stored password hash is not valid bcrypt");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{CredentialRepositoryError, MockCredentialRepository};
    use rstest::{fixture, rstest};

    #[fixture]
    fn secret_hash() -> String {
        bcrypt::hash("secret", 4).expect("hash fixture password")
    }

    fn service_with(hash: Option<String>) -> CredentialLoginService {
        let mut repo = MockCredentialRepository::new();
        repo.expect_password_hash()
            .returning(move |_| Ok(hash.clone()));
        CredentialLoginService::new(Arc::new(repo))
    }

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("credential shape")
    }

    #[rstest]
    #[tokio::test]
    async fn correct_password_authenticates(secret_hash: String) {
        let service = service_with(Some(secret_hash));
        let user = service
            .authenticate(&credentials("admin", "secret"))
            .await
            .expect("authenticated");
        assert_eq!(user.as_str(), "admin");
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_unauthorised(secret_hash: String) {
        let service = service_with(Some(secret_hash));
        let err = service
            .authenticate(&credentials("admin", "wrong"))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_unauthorised() {
        let service = service_with(None);
        let err = service
            .authenticate(&credentials("nobody", "secret"))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_is_treated_as_failed_sign_in() {
        let service = service_with(Some("not-a-bcrypt-hash".to_owned()));
        let err = service
            .authenticate(&credentials("admin", "secret"))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failure_is_internal() {
        let mut repo = MockCredentialRepository::new();
        repo.expect_password_hash()
            .returning(|_| Err(CredentialRepositoryError::unavailable("offline")));
        let service = CredentialLoginService::new(Arc::new(repo));
        let err = service
            .authenticate(&credentials("admin", "secret"))
            .await
            .expect_err("failed");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}

//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DocumentRepository, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-in use case.
    pub login: Arc<dyn LoginService>,
    /// Document storage.
    pub documents: Arc<dyn DocumentRepository>,
}

impl HttpState {
    /// Construct state from its ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use cms::domain::CredentialLoginService;
    /// use cms::inbound::http::state::HttpState;
    /// use cms::outbound::{CapDocumentRepository, YamlCredentialRepository};
    ///
    /// let documents = CapDocumentRepository::open(std::path::Path::new("data")).expect("documents dir");
    /// let credentials = Arc::new(YamlCredentialRepository::default());
    /// let state = HttpState::new(
    ///     Arc::new(CredentialLoginService::new(credentials)),
    ///     Arc::new(documents),
    /// );
    /// let _documents = state.documents.clone();
    /// ```
    pub fn new(login: Arc<dyn LoginService>, documents: Arc<dyn DocumentRepository>) -> Self {
        Self { login, documents }
    }
}

//! Driven port for document storage.
//!
//! Handlers only ever talk to this trait, so the flat-file backend can be
//! replaced (for example by an embedded database) without touching them.

use async_trait::async_trait;

use crate::domain::{Document, DocumentName};

use super::define_port_error;

define_port_error! {
    /// Failures raised by document store adapters.
    pub enum DocumentRepositoryError {
        /// The named document does not exist.
        NotFound { name: String } => "document {name} does not exist",
        /// The backing storage failed.
        Storage { message: String } => "document storage failed: {message}",
    }
}

/// Flat collection of documents keyed by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Names of every stored document, sorted.
    async fn list(&self) -> Result<Vec<DocumentName>, DocumentRepositoryError>;

    /// Whether a document with `name` exists.
    async fn exists(&self, name: &DocumentName) -> Result<bool, DocumentRepositoryError>;

    /// Load a document; fails with `NotFound` when absent.
    async fn read(&self, name: &DocumentName) -> Result<Document, DocumentRepositoryError>;

    /// Replace the full content of `name`, creating it when absent.
    async fn write(
        &self,
        name: &DocumentName,
        content: &[u8],
    ) -> Result<(), DocumentRepositoryError>;

    /// Remove a document; fails with `NotFound` when absent.
    async fn delete(&self, name: &DocumentName) -> Result<(), DocumentRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_build_variants() {
        assert_eq!(
            DocumentRepositoryError::not_found("a.txt"),
            DocumentRepositoryError::NotFound {
                name: "a.txt".to_owned()
            }
        );
        assert_eq!(
            DocumentRepositoryError::storage("disk full").to_string(),
            "document storage failed: disk full"
        );
    }
}

//! Outbound adapters implementing domain ports.
//!
//! - **documents**: flat-directory document store over `cap_std`
//! - **credentials**: YAML credential file held in memory
//!
//! Adapters translate between domain types and storage representations and
//! carry no business logic.

pub mod credentials;
pub mod documents;

pub use credentials::{CredentialStoreLoadError, YamlCredentialRepository};
pub use documents::CapDocumentRepository;

//! Domain primitives, services, and ports.
//!
//! Purpose: define transport-agnostic types for documents and sign-in, the
//! content renderer, and the ports that adapters implement. Nothing in here
//! knows about HTTP or the filesystem.
//!
//! Public surface:
//! - `DocumentName`, `ContentKind`, `Document` — document identity and kind.
//! - `Username`, `LoginCredentials` — sign-in inputs.
//! - `render_document` — extension-driven rendering.
//! - `CredentialLoginService` — bcrypt-backed `LoginService`.
//! - `Error`, `ErrorCode` — domain failures.

pub mod auth;
pub mod document;
pub mod error;
pub mod login;
pub mod ports;
pub mod rendering;
pub mod trace_id;

pub use self::auth::{LoginCredentials, LoginValidationError, Username};
pub use self::document::{
    ContentKind, DOCUMENT_NAME_MAX, Document, DocumentName, DocumentNameError,
};
pub use self::error::{Error, ErrorCode};
pub use self::login::{CredentialLoginService, INVALID_CREDENTIALS};
pub use self::rendering::{RenderedDocument, markdown_to_html, render_document};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

//! Minimal content-management service library.
//!
//! Signed-in users manage a flat collection of text and markdown documents
//! through server-rendered pages. The binary in `main.rs` wires these
//! modules into an Actix server.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::Trace;

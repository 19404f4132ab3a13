//! Complaint desk library.
//!
//! The desk keeps accounts with a single signed-in session, complaints with
//! their status history, and a theme preference. Everything is persisted as
//! versioned JSON documents through a key-value store port and served over a
//! local HTTP API under `/api/v1`.
//!
//! Layout follows a ports-and-adapters split:
//!
//! - [`domain`]: managers, validation and the outbound port traits
//! - [`outbound`]: the on-disk store and the Argon2 password hasher
//! - [`inbound`]: Actix handlers, request validation and OpenAPI schemas

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

//! Contract workflow backend.
//!
//! Government-contract pursuits, their tasks and the users who work them,
//! with role-based access and an append-only audit trail. The crate is laid
//! out hexagonally: [`domain`] owns records, policy and services; [`inbound`]
//! exposes them over HTTP; [`outbound`] stores them.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

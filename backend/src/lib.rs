//! Article service library.
//!
//! Stores articles and enriches them with author data from the identity
//! service, retrying author checks on create and degrading gracefully on
//! reads. Layout is hexagonal: [`domain`] holds the model, ports and
//! enrichment logic; [`inbound`] and [`outbound`] hold the adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::trace::{Trace, TraceId};

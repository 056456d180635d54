//! Identity-service outbound adapter.
//!
//! Implements the `AuthorSource` port over the identity service's JSON API
//! and normalises every response, failure and timeout into an
//! `UpstreamOutcome`.

mod dto;
mod http_client;

pub use http_client::{UserServiceClient, UserServiceClientConfig, UserServiceConnectError};

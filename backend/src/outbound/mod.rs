//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: article storage in PostgreSQL (Diesel) or in memory
//! - **user_service**: HTTP client for the identity service's user lookup
//! - **auth**: JWT verification and the Redis revocation list
//!
//! Adapters translate between domain types and infrastructure
//! representations and carry no business rules.

pub mod auth;
pub mod persistence;
pub mod user_service;

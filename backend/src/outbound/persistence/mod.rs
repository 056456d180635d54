//! Article storage adapters.
//!
//! PostgreSQL via Diesel (`diesel-async` over a `bb8` pool) for deployed
//! environments and a process-local map for development and tests. Row
//! structs and the Diesel schema stay private to this module; adapters only
//! translate between rows and domain types.

mod diesel_article_repository;
mod diesel_basic_error_mapping;
mod in_memory_article_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_article_repository::DieselArticleRepository;
pub use in_memory_article_repository::InMemoryArticleRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! Shared Diesel error mapping for article storage.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constructors a repository supplies for each failure class.
pub struct DieselErrorConstructors<Q, C, U> {
    /// Query failures.
    pub query: Q,
    /// Lost or closed connections.
    pub connection: C,
    /// Unique-constraint violations.
    pub conflict: U,
}

/// Map Diesel errors to repository errors without leaking SQL text.
///
/// `NotFound` is mapped to a query error; repositories that treat a missing
/// row as a domain outcome must handle it before calling this.
pub fn map_basic_diesel_error<E, Q, C, U>(
    error: diesel::result::Error,
    constructors: DieselErrorConstructors<Q, C, U>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    U: FnOnce(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            (constructors.conflict)("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (constructors.connection)("database connection error")
        }
        DieselError::NotFound => (constructors.query)("record not found"),
        DieselError::QueryBuilderError(_) => (constructors.query)("database query error"),
        _ => (constructors.query)("database error"),
    }
}

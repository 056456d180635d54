//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; `diesel print-schema` can
//! regenerate it from a migrated database.

diesel::table! {
    /// Stored articles.
    ///
    /// `user_id` references a user held by the identity service; there is no
    /// foreign key because that table lives in another database.
    articles (id) {
        /// Primary key assigned by a sequence.
        id -> Int4,
        /// Article title.
        title -> Varchar,
        /// Article body.
        content -> Text,
        /// Owning author in the identity service.
        user_id -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (maintained by trigger).
        updated_at -> Timestamptz,
    }
}

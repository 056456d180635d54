//! Internal Diesel row structs for the `articles` table.
//!
//! These never leave the persistence layer; repositories convert them into
//! validated domain articles.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::articles;

/// Row read from `articles`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable article; timestamps come from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub(crate) struct NewArticleRow<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub user_id: i32,
}

/// Changeset for title and content; `updated_at` is set by trigger.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = articles)]
pub(crate) struct ArticleUpdate<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

//! Driven port for article storage.
//!
//! The storage collaborator is plain parameterised CRUD over one table. The
//! domain owns the contract so the service can run against PostgreSQL in
//! production and an in-memory map in development and tests.

use async_trait::async_trait;

use crate::domain::{Article, ArticleDraft, ArticleId, AuthorId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by article storage adapters.
    pub enum ArticleRepositoryError {
        /// No row matched the identifier.
        NotFound { id: i32 } => "article with ID {id} not found",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "article conflict: {message}",
        /// Connection could not be established or checked out.
        Connection { message: String } => "article repository connection failed: {message}",
        /// Query execution or decoding failed.
        Query { message: String } => "article repository query failed: {message}",
    }
}

/// Rows for one page plus the total matching count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleListing {
    /// Rows in storage order (newest first).
    pub articles: Vec<Article>,
    /// Total rows matching the query across all pages.
    pub total: u64,
}

/// Port for persisting and querying articles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Load one article.
    async fn get_by_id(&self, id: ArticleId) -> Result<Article, ArticleRepositoryError>;

    /// Insert a new article owned by `author_id`.
    async fn create(
        &self,
        author_id: AuthorId,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleRepositoryError>;

    /// Overwrite title and content, refreshing `updated_at`.
    async fn update(
        &self,
        id: ArticleId,
        title: &str,
        content: &str,
    ) -> Result<Article, ArticleRepositoryError>;

    /// Remove one article.
    async fn delete(&self, id: ArticleId) -> Result<(), ArticleRepositoryError>;

    /// Page through one author's articles.
    async fn list_by_author(
        &self,
        author_id: AuthorId,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError>;

    /// Page through all articles.
    async fn list_all(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError>;
}

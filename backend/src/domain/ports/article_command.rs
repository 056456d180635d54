//! Driving port for article writes.

use async_trait::async_trait;

use crate::domain::{Article, ArticleDraft, ArticleId, ArticlePatch, AuthorId, CallContext, Error};

/// Use-cases that change stored articles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleCommand: Send + Sync {
    /// Verify that `author` exists upstream, then persist the draft.
    async fn create_article(
        &self,
        ctx: &CallContext,
        author: AuthorId,
        draft: ArticleDraft,
    ) -> Result<Article, Error>;

    /// Apply a partial update.
    async fn update_article(
        &self,
        ctx: &CallContext,
        id: ArticleId,
        patch: ArticlePatch,
    ) -> Result<Article, Error>;

    /// Delete an article and return the row as it was before deletion.
    async fn delete_article(&self, ctx: &CallContext, id: ArticleId) -> Result<Article, Error>;
}

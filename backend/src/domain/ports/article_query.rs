//! Driving port for enriched article reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{ArticleId, AuthorId, CallContext, EnrichedArticle, Error};

/// Parameters for listing articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListArticlesRequest {
    /// Normalised page window.
    pub page: PageRequest,
    /// Restrict to one author when set.
    pub author_filter: Option<AuthorId>,
}

/// Read use-cases returning articles enriched with author data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleQuery: Send + Sync {
    /// Load one article; the author is `None` when the lookup fails.
    async fn get_article(&self, ctx: &CallContext, id: ArticleId)
    -> Result<EnrichedArticle, Error>;

    /// Load one page of articles, degrading per row.
    async fn list_articles(
        &self,
        ctx: &CallContext,
        request: ListArticlesRequest,
    ) -> Result<Page<EnrichedArticle>, Error>;
}

//! Article service: storage CRUD plus author enrichment.
//!
//! Reads attach author data with one non-retried lookup per distinct
//! author and degrade to a `null` author on any failure. Creation treats the
//! author as a hard precondition and verifies it through the retry policy.
//! Updates and deletes never call the identity service.

mod mapping;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use pagination::Page;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ArticleCommand, ArticleQuery, ArticleRepository, AuthorSource, ListArticlesRequest,
    UpstreamOutcome,
};
use crate::domain::{
    Article, ArticleDraft, ArticleId, ArticlePatch, AuthorId, AuthorView, CallContext,
    EnrichedArticle, Error, Interrupted, RetryPolicy,
};

use self::mapping::{map_repository_error, map_verification_outcome};

/// Domain service implementing [`ArticleCommand`] and [`ArticleQuery`].
pub struct ArticleService<R: ?Sized, A: ?Sized> {
    articles: Arc<R>,
    authors: Arc<A>,
    retry: RetryPolicy,
}

impl<R: ?Sized, A: ?Sized> Clone for ArticleService<R, A> {
    fn clone(&self) -> Self {
        Self {
            articles: Arc::clone(&self.articles),
            authors: Arc::clone(&self.authors),
            retry: self.retry.clone(),
        }
    }
}

impl<R: ?Sized, A: ?Sized> ArticleService<R, A> {
    /// Build the service from its storage and identity-service ports.
    pub fn new(articles: Arc<R>, authors: Arc<A>, retry: RetryPolicy) -> Self {
        Self {
            articles,
            authors,
            retry,
        }
    }
}

impl<R, A> ArticleService<R, A>
where
    R: ArticleRepository + ?Sized,
    A: AuthorSource + ?Sized,
{
    async fn load(&self, ctx: &CallContext, id: ArticleId) -> Result<Article, Error> {
        ctx.run(self.articles.get_by_id(id))
            .await?
            .map_err(map_repository_error)
    }

    /// One lookup, no retry. Anything but `Found` is absorbed into `None`.
    async fn lookup(
        &self,
        ctx: &CallContext,
        author_id: AuthorId,
    ) -> Result<Option<AuthorView>, Interrupted> {
        match self.authors.fetch_author(author_id, ctx).await? {
            UpstreamOutcome::Found(author) => Ok(Some(author)),
            outcome => {
                warn!(
                    %author_id,
                    outcome = outcome.label(),
                    "author lookup failed; degrading to article without author"
                );
                Ok(None)
            }
        }
    }

    async fn verify_author(&self, ctx: &CallContext, author_id: AuthorId) -> Result<(), Error> {
        let report = self
            .retry
            .run(ctx, |attempt| {
                debug!(%author_id, attempt, "verifying author");
                self.authors.fetch_author(author_id, ctx)
            })
            .await?;
        map_verification_outcome(author_id, &report)
    }
}

#[async_trait]
impl<R, A> ArticleQuery for ArticleService<R, A>
where
    R: ArticleRepository + ?Sized,
    A: AuthorSource + ?Sized,
{
    async fn get_article(
        &self,
        ctx: &CallContext,
        id: ArticleId,
    ) -> Result<EnrichedArticle, Error> {
        let article = self.load(ctx, id).await?;
        let enriched = match self.lookup(ctx, article.author_id).await? {
            Some(author) => EnrichedArticle::complete(article, author),
            None => EnrichedArticle::degraded(article),
        };
        Ok(enriched)
    }

    async fn list_articles(
        &self,
        ctx: &CallContext,
        request: ListArticlesRequest,
    ) -> Result<Page<EnrichedArticle>, Error> {
        let limit = request.page.limit();
        let offset = request.page.offset();
        let listing = match request.author_filter {
            Some(author_id) => {
                ctx.run(self.articles.list_by_author(author_id, limit, offset))
                    .await?
            }
            None => ctx.run(self.articles.list_all(limit, offset)).await?,
        }
        .map_err(map_repository_error)?;

        let distinct: BTreeSet<AuthorId> = listing
            .articles
            .iter()
            .map(|article| article.author_id)
            .collect();
        let lookups = join_all(distinct.into_iter().map(|author_id| async move {
            (author_id, self.lookup(ctx, author_id).await)
        }))
        .await;

        let mut authors = HashMap::with_capacity(lookups.len());
        for (author_id, lookup) in lookups {
            authors.insert(author_id, lookup?);
        }

        let items = listing
            .articles
            .into_iter()
            .map(|article| match authors.get(&article.author_id) {
                Some(Some(author)) => EnrichedArticle::complete(article, author.clone()),
                _ => EnrichedArticle::degraded(article),
            })
            .collect();
        Ok(Page::new(request.page, items, listing.total))
    }
}

#[async_trait]
impl<R, A> ArticleCommand for ArticleService<R, A>
where
    R: ArticleRepository + ?Sized,
    A: AuthorSource + ?Sized,
{
    async fn create_article(
        &self,
        ctx: &CallContext,
        author: AuthorId,
        draft: ArticleDraft,
    ) -> Result<Article, Error> {
        self.verify_author(ctx, author).await?;
        let article = ctx
            .run(self.articles.create(author, &draft))
            .await?
            .map_err(map_repository_error)?;
        info!(article_id = %article.id, author_id = %author, "article created");
        Ok(article)
    }

    async fn update_article(
        &self,
        ctx: &CallContext,
        id: ArticleId,
        patch: ArticlePatch,
    ) -> Result<Article, Error> {
        let current = self.load(ctx, id).await?;
        let (title, content) = patch.apply(&current);
        let article = ctx
            .run(self.articles.update(id, &title, &content))
            .await?
            .map_err(map_repository_error)?;
        info!(article_id = %id, "article updated");
        Ok(article)
    }

    async fn delete_article(&self, ctx: &CallContext, id: ArticleId) -> Result<Article, Error> {
        let article = self.load(ctx, id).await?;
        ctx.run(self.articles.delete(id))
            .await?
            .map_err(map_repository_error)?;
        info!(article_id = %id, "article deleted");
        Ok(article)
    }
}

#[cfg(test)]
mod tests;

//! Process-local `ArticleRepository` used when no database is configured.
//!
//! Contents are lost on restart. Ordering and error semantics match the
//! PostgreSQL adapter so handlers behave identically against either.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ArticleListing, ArticleRepository, ArticleRepositoryError};
use crate::domain::{Article, ArticleDraft, ArticleId, AuthorId};

#[derive(Debug, Default)]
struct Store {
    rows: BTreeMap<i32, Article>,
    last_id: i32,
}

/// In-memory article storage guarded by a mutex.
#[derive(Clone)]
pub struct InMemoryArticleRepository {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for InMemoryArticleRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryArticleRepository {
    /// Create an empty repository stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, ArticleRepositoryError> {
        self.store
            .lock()
            .map_err(|_| ArticleRepositoryError::query("article store lock poisoned"))
    }

    fn page<'a>(
        rows: impl Iterator<Item = &'a Article>,
        limit: i64,
        offset: i64,
    ) -> ArticleListing {
        let mut matching: Vec<&Article> = rows.collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = matching.len() as u64;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        ArticleListing {
            articles: matching.into_iter().skip(skip).take(take).cloned().collect(),
            total,
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn get_by_id(&self, id: ArticleId) -> Result<Article, ArticleRepositoryError> {
        self.lock()?
            .rows
            .get(&id.get())
            .cloned()
            .ok_or_else(|| ArticleRepositoryError::not_found(id.get()))
    }

    async fn create(
        &self,
        author_id: AuthorId,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        let next = store
            .last_id
            .checked_add(1)
            .ok_or_else(|| ArticleRepositoryError::query("article id sequence exhausted"))?;
        let id = ArticleId::new(i64::from(next))
            .map_err(|err| ArticleRepositoryError::query(err.to_string()))?;
        let article = Article {
            id,
            title: draft.title().to_owned(),
            content: draft.content().to_owned(),
            author_id,
            created_at: now,
            updated_at: now,
        };
        store.last_id = next;
        store.rows.insert(next, article.clone());
        Ok(article)
    }

    async fn update(
        &self,
        id: ArticleId,
        title: &str,
        content: &str,
    ) -> Result<Article, ArticleRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        let row = store
            .rows
            .get_mut(&id.get())
            .ok_or_else(|| ArticleRepositoryError::not_found(id.get()))?;
        title.clone_into(&mut row.title);
        content.clone_into(&mut row.content);
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete(&self, id: ArticleId) -> Result<(), ArticleRepositoryError> {
        self.lock()?
            .rows
            .remove(&id.get())
            .map(|_| ())
            .ok_or_else(|| ArticleRepositoryError::not_found(id.get()))
    }

    async fn list_by_author(
        &self,
        author_id: AuthorId,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError> {
        let store = self.lock()?;
        Ok(Self::page(
            store.rows.values().filter(|row| row.author_id == author_id),
            limit,
            offset,
        ))
    }

    async fn list_all(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError> {
        let store = self.lock()?;
        Ok(Self::page(store.rows.values(), limit, offset))
    }
}

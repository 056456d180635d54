//! PostgreSQL-backed `ArticleRepository` implementation using Diesel ORM.
//!
//! Plain parameterised CRUD over the `articles` table. Listings are ordered
//! newest first with the identifier as tie-breaker so pages are stable.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ArticleListing, ArticleRepository, ArticleRepositoryError};
use crate::domain::{Article, ArticleDraft, ArticleId, AuthorId};

use super::diesel_basic_error_mapping::{
    DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ArticleRow, ArticleUpdate, NewArticleRow};
use super::pool::{DbPool, PoolError};
use super::schema::articles;

/// Diesel-backed implementation of the article repository port.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    map_basic_pool_error(error, ArticleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ArticleRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: ArticleRepositoryError::query,
            connection: ArticleRepositoryError::connection,
            conflict: ArticleRepositoryError::conflict,
        },
    )
}

/// `NotFound` for a keyed lookup is a domain outcome, not a query failure.
fn map_keyed_error(id: ArticleId) -> impl FnOnce(diesel::result::Error) -> ArticleRepositoryError {
    move |error| match error {
        diesel::result::Error::NotFound => ArticleRepositoryError::not_found(id.get()),
        other => map_diesel_error(other),
    }
}

pub(crate) fn row_to_article(row: ArticleRow) -> Result<Article, ArticleRepositoryError> {
    let ArticleRow {
        id,
        title,
        content,
        user_id,
        created_at,
        updated_at,
    } = row;
    Ok(Article {
        id: ArticleId::new(i64::from(id))
            .map_err(|err| ArticleRepositoryError::query(format!("row {id}: {err}")))?,
        title,
        content,
        author_id: AuthorId::new(i64::from(user_id))
            .map_err(|err| ArticleRepositoryError::query(format!("row {id}: {err}")))?,
        created_at,
        updated_at,
    })
}

fn rows_to_listing(rows: Vec<ArticleRow>, total: i64) -> Result<ArticleListing, ArticleRepositoryError> {
    let articles = rows
        .into_iter()
        .map(row_to_article)
        .collect::<Result<Vec<_>, _>>()?;
    let total = u64::try_from(total)
        .map_err(|_| ArticleRepositoryError::query(format!("negative row count {total}")))?;
    Ok(ArticleListing { articles, total })
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn get_by_id(&self, id: ArticleId) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = articles::table
            .find(id.get())
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_keyed_error(id))?;
        row_to_article(row)
    }

    async fn create(
        &self,
        author_id: AuthorId,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(articles::table)
            .values(NewArticleRow {
                title: draft.title(),
                content: draft.content(),
                user_id: author_id.get(),
            })
            .returning(ArticleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_article(row)
    }

    async fn update(
        &self,
        id: ArticleId,
        title: &str,
        content: &str,
    ) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(articles::table.find(id.get()))
            .set(ArticleUpdate { title, content })
            .returning(ArticleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_keyed_error(id))?;
        row_to_article(row)
    }

    async fn delete(&self, id: ArticleId) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(articles::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(ArticleRepositoryError::not_found(id.get()));
        }
        Ok(())
    }

    async fn list_by_author(
        &self,
        author_id: AuthorId,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = articles::table
            .filter(articles::user_id.eq(author_id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = articles::table
            .filter(articles::user_id.eq(author_id.get()))
            .order((articles::created_at.desc(), articles::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_listing(rows, total)
    }

    async fn list_all(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<ArticleListing, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = articles::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = articles::table
            .order((articles::created_at.desc(), articles::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_listing(rows, total)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; queries run against PostgreSQL only.

    use chrono::{TimeZone, Utc};

    use super::*;

    fn row(id: i32, user_id: i32) -> ArticleRow {
        let at = Utc
            .with_ymd_and_hms(2025, 2, 1, 8, 0, 0)
            .single()
            .expect("valid instant");
        ArticleRow {
            id,
            title: "T".into(),
            content: "C".into(),
            user_id,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn valid_rows_convert_to_articles() {
        let article = row_to_article(row(3, 9)).expect("valid row");
        assert_eq!(article.id.get(), 3);
        assert_eq!(article.author_id.get(), 9);
    }

    #[test]
    fn rows_with_invalid_author_are_query_errors() {
        let error = row_to_article(row(3, 0)).expect_err("author id must be positive");
        assert!(matches!(error, ArticleRepositoryError::Query { .. }));
    }

    #[test]
    fn listing_carries_total() {
        let listing = rows_to_listing(vec![row(2, 1), row(1, 1)], 12).expect("valid rows");
        assert_eq!(listing.articles.len(), 2);
        assert_eq!(listing.total, 12);
    }

    #[test]
    fn keyed_lookup_turns_missing_rows_into_not_found() {
        let id = ArticleId::new(4).expect("valid id");
        let error = map_keyed_error(id)(diesel::result::Error::NotFound);
        assert_eq!(error, ArticleRepositoryError::not_found(4));
    }
}

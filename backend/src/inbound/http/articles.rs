//! Article HTTP handlers.
//!
//! ```text
//! POST   /api/v1/articles            (bearer)
//! GET    /api/v1/articles/{id}
//! GET    /api/v1/articles?page_number=&page_size=&author_id=
//! PATCH  /api/v1/articles/{id}       (bearer)
//! DELETE /api/v1/articles/{id}       (bearer)
//! ```
//!
//! Handlers translate wire input into validated domain values, run the use
//! case under a per-request [`CallContext`](crate::domain::CallContext), and
//! wrap results in the shared envelope.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ListArticlesRequest;
use crate::domain::{Article, ArticleDraft, ArticleId, ArticlePatch, AuthorId, EnrichedArticle};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{ApiResult, Envelope, ErrorEnvelope, created, ok};
use crate::inbound::http::state::HttpState;

/// Message returned with an article whose author could not be loaded.
pub const DEGRADED_MESSAGE: &str = "success (author information unavailable)";

/// Body for `POST /api/v1/articles`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Ignored; the author is taken from the bearer credential.
    #[serde(default)]
    #[schema(deprecated)]
    pub user_id: Option<i64>,
}

/// Body for `PATCH /api/v1/articles/{id}`; empty fields keep stored values.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Query string for `GET /api/v1/articles`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListArticlesParams {
    /// 1-based page; defaults to 1.
    pub page_number: Option<i64>,
    /// Items per page, clamped to 1..=100; defaults to 10.
    pub page_size: Option<i64>,
    /// Restrict to one author; 0 or absent lists everyone.
    pub author_id: Option<i64>,
}

/// Payload carrying one stored article.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleData {
    pub article: Article,
}

/// Payload carrying one article with its author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedArticleData {
    pub article: EnrichedArticle,
}

/// Payload carrying one page of articles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleListData {
    pub articles: Vec<EnrichedArticle>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

impl From<Page<EnrichedArticle>> for ArticleListData {
    fn from(page: Page<EnrichedArticle>) -> Self {
        let total = page.total();
        let current = page.page();
        let total_pages = page.total_pages();
        Self {
            articles: page.into_items(),
            total,
            page: current,
            total_pages,
        }
    }
}

fn parse_article_id(raw: i64) -> ApiResult<ArticleId> {
    Ok(ArticleId::new(raw)?)
}

fn parse_list_params(params: ListArticlesParams) -> ApiResult<ListArticlesRequest> {
    let author_filter = match params.author_id {
        None | Some(0) => None,
        Some(raw) => Some(AuthorId::new(raw)?),
    };
    Ok(ListArticlesRequest {
        page: PageRequest::normalise(params.page_number, params.page_size),
        author_filter,
    })
}

/// Create an article owned by the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = Envelope<ArticleData>),
        (status = 400, description = "Invalid input or unknown author", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid credential", body = ErrorEnvelope),
        (status = 403, description = "Credential without identity", body = ErrorEnvelope),
        (status = 503, description = "Identity service unavailable", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "createArticle",
    security(("bearer" = []))
)]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateArticleRequest>,
) -> ApiResult<HttpResponse> {
    let CreateArticleRequest {
        title,
        content,
        user_id,
    } = payload.into_inner();
    let author = caller.author_id();
    if let Some(claimed) = user_id.filter(|claimed| *claimed != i64::from(author.get())) {
        info!(claimed, author_id = %author, "ignoring user_id that disagrees with credential");
    }
    let draft = ArticleDraft::new(title, content)?;
    let (ctx, _guard) = state.call_context();
    let article = state.articles.create_article(&ctx, author, draft).await?;
    Ok(created(ArticleData { article }))
}

/// Fetch one article with its author, degrading when the author is unavailable.
#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    params(("id" = i64, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Article, author may be null", body = Envelope<EnrichedArticleData>),
        (status = 400, description = "Invalid identifier", body = ErrorEnvelope),
        (status = 404, description = "Article not found", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "getArticle"
)]
#[get("/articles/{id}")]
pub async fn get_article(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(path.into_inner())?;
    let (ctx, _guard) = state.call_context();
    let article = state.articles_query.get_article(&ctx, id).await?;
    let body = if article.is_degraded() {
        Envelope::success_with_message(DEGRADED_MESSAGE, EnrichedArticleData { article })
    } else {
        Envelope::success(EnrichedArticleData { article })
    };
    Ok(HttpResponse::Ok().json(body))
}

/// List articles newest first, degrading authors per row.
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    params(ListArticlesParams),
    responses(
        (status = 200, description = "Page of articles", body = Envelope<ArticleListData>),
        (status = 400, description = "Invalid parameters", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "listArticles"
)]
#[get("/articles")]
pub async fn list_articles(
    state: web::Data<HttpState>,
    query: web::Query<ListArticlesParams>,
) -> ApiResult<HttpResponse> {
    let request = parse_list_params(query.into_inner())?;
    let (ctx, _guard) = state.call_context();
    let page = state.articles_query.list_articles(&ctx, request).await?;
    Ok(ok(ArticleListData::from(page)))
}

/// Partially update an article.
#[utoipa::path(
    patch,
    path = "/api/v1/articles/{id}",
    params(("id" = i64, Path, description = "Article identifier")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated article", body = Envelope<ArticleData>),
        (status = 400, description = "Invalid input", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid credential", body = ErrorEnvelope),
        (status = 404, description = "Article not found", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "updateArticle",
    security(("bearer" = []))
)]
#[patch("/articles/{id}")]
pub async fn update_article(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<UpdateArticleRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(path.into_inner())?;
    let UpdateArticleRequest { title, content } = payload.into_inner();
    let patch = ArticlePatch::new(title, content)?;
    let (ctx, _guard) = state.call_context();
    let article = state.articles.update_article(&ctx, id, patch).await?;
    Ok(ok(ArticleData { article }))
}

/// Delete an article, returning it as it was.
#[utoipa::path(
    delete,
    path = "/api/v1/articles/{id}",
    params(("id" = i64, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Deleted article", body = Envelope<ArticleData>),
        (status = 400, description = "Invalid identifier", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid credential", body = ErrorEnvelope),
        (status = 404, description = "Article not found", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "deleteArticle",
    security(("bearer" = []))
)]
#[delete("/articles/{id}")]
pub async fn delete_article(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(path.into_inner())?;
    let (ctx, _guard) = state.call_context();
    let article = state.articles.delete_article(&ctx, id).await?;
    Ok(ok(ArticleData { article }))
}

#[cfg(test)]
#[path = "articles_tests.rs"]
mod tests;

//! Orchestration behaviour: degradation on reads, hard precondition on
//! create, storage-only updates and deletes.

use std::sync::Arc;
use std::time::Duration;

use pagination::PageRequest;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    ArticleListing, ArticleRepositoryError, MockArticleRepository, PermanentKind, TransientKind,
};
use crate::domain::{ErrorCode, RetryConfig};
use crate::test_support::{RecordingSleeper, ScriptedAuthorSource, sample_article, sample_author};

type Service = ArticleService<MockArticleRepository, ScriptedAuthorSource>;

fn service_with(
    repo: MockArticleRepository,
    authors: ScriptedAuthorSource,
) -> (Service, Arc<ScriptedAuthorSource>, Arc<RecordingSleeper>) {
    let authors = Arc::new(authors);
    let sleeper = Arc::new(RecordingSleeper::default());
    let retry = RetryPolicy::with_sleeper(RetryConfig::default(), sleeper.clone());
    (
        ArticleService::new(Arc::new(repo), Arc::clone(&authors), retry),
        authors,
        sleeper,
    )
}

fn article_id(raw: i64) -> ArticleId {
    ArticleId::new(raw).expect("valid article id")
}

fn author_id(raw: i64) -> AuthorId {
    AuthorId::new(raw).expect("valid author id")
}

fn repo_returning(article: Article) -> MockArticleRepository {
    let mut repo = MockArticleRepository::new();
    repo.expect_get_by_id()
        .returning(move |_| Ok(article.clone()));
    repo
}

#[tokio::test]
async fn get_attaches_author_when_lookup_succeeds() {
    let (service, authors, _) = service_with(
        repo_returning(sample_article(1, 7)),
        ScriptedAuthorSource::always_found(),
    );

    let enriched = service
        .get_article(&CallContext::background(), article_id(1))
        .await
        .expect("article loads");

    assert_eq!(enriched.article, sample_article(1, 7));
    assert_eq!(enriched.author, Some(sample_author(7)));
    assert_eq!(authors.calls(), vec![author_id(7)]);
}

#[rstest]
#[case::not_found(UpstreamOutcome::NotFound)]
#[case::timeout(UpstreamOutcome::TransientFailure(TransientKind::Timeout))]
#[case::unavailable(UpstreamOutcome::TransientFailure(TransientKind::Overloaded))]
#[case::permanent(UpstreamOutcome::PermanentFailure(PermanentKind::MalformedResponse))]
#[tokio::test]
async fn get_degrades_without_retrying(#[case] outcome: UpstreamOutcome) {
    let (service, authors, sleeper) = service_with(
        repo_returning(sample_article(1, 7)),
        ScriptedAuthorSource::new(outcome),
    );

    let enriched = service
        .get_article(&CallContext::background(), article_id(1))
        .await
        .expect("degraded read still succeeds");

    assert!(enriched.is_degraded());
    assert_eq!(enriched.article.title, "Title 1");
    assert_eq!(authors.call_count(), 1);
    assert!(sleeper.delays().is_empty());
}

#[rstest]
#[case(ArticleRepositoryError::not_found(9), ErrorCode::NotFound)]
#[case(ArticleRepositoryError::connection("refused"), ErrorCode::Internal)]
#[tokio::test]
async fn get_fails_when_article_cannot_load(
    #[case] failure: ArticleRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockArticleRepository::new();
    repo.expect_get_by_id()
        .returning(move |_| Err(failure.clone()));
    let (service, authors, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let error = service
        .get_article(&CallContext::background(), article_id(9))
        .await
        .expect_err("load failure is fatal");

    assert_eq!(error.code(), expected);
    assert_eq!(authors.call_count(), 0);
}

#[tokio::test]
async fn get_surfaces_caller_cancellation() {
    let (service, _, _) = service_with(
        repo_returning(sample_article(1, 7)),
        ScriptedAuthorSource::always_found(),
    );
    let ctx = CallContext::background();
    ctx.cancel();

    let error = service
        .get_article(&ctx, article_id(1))
        .await
        .expect_err("cancelled");

    assert_eq!(error.code(), ErrorCode::Unknown);
}

#[tokio::test]
async fn list_degrades_per_row_and_keeps_storage_order() {
    let rows = vec![
        sample_article(3, 1),
        sample_article(2, 2),
        sample_article(1, 1),
    ];
    let mut repo = MockArticleRepository::new();
    let listing = ArticleListing {
        articles: rows.clone(),
        total: 3,
    };
    repo.expect_list_all()
        .withf(|limit, offset| *limit == 10 && *offset == 0)
        .returning(move |_, _| Ok(listing.clone()));
    let (service, authors, _) = service_with(
        repo,
        ScriptedAuthorSource::always_found().script(
            2,
            vec![UpstreamOutcome::TransientFailure(TransientKind::Timeout)],
        ),
    );

    let page = service
        .list_articles(&CallContext::background(), ListArticlesRequest::default())
        .await
        .expect("list succeeds");

    let ids: Vec<i32> = page.items().iter().map(|row| row.article.id.get()).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    let authors_present: Vec<bool> = page.items().iter().map(|row| row.author.is_some()).collect();
    assert_eq!(authors_present, vec![true, false, true]);
    assert_eq!(authors.call_count(), 2, "one lookup per distinct author");
    assert_eq!(page.total(), 3);
    assert_eq!(page.total_pages(), 1);
}

#[tokio::test]
async fn list_with_author_filter_uses_filtered_query_and_offset() {
    let mut repo = MockArticleRepository::new();
    repo.expect_list_by_author()
        .withf(|author, limit, offset| author.get() == 4 && *limit == 5 && *offset == 10)
        .returning(|_, _, _| {
            Ok(ArticleListing {
                articles: vec![sample_article(11, 4)],
                total: 11,
            })
        });
    repo.expect_list_all().never();
    let (service, _, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let page = service
        .list_articles(
            &CallContext::background(),
            ListArticlesRequest {
                page: PageRequest::normalise(Some(3), Some(5)),
                author_filter: Some(author_id(4)),
            },
        )
        .await
        .expect("list succeeds");

    assert_eq!(page.items().len(), 1);
    assert_eq!(page.page(), 3);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn list_of_empty_page_makes_no_lookups() {
    let mut repo = MockArticleRepository::new();
    repo.expect_list_all()
        .returning(|_, _| Ok(ArticleListing::default()));
    let (service, authors, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let page = service
        .list_articles(&CallContext::background(), ListArticlesRequest::default())
        .await
        .expect("list succeeds");

    assert!(page.items().is_empty());
    assert_eq!(page.total_pages(), 0);
    assert_eq!(authors.call_count(), 0);
}

#[tokio::test]
async fn create_persists_after_author_is_verified() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create()
        .withf(|author, draft| author.get() == 1 && draft.title() == "T" && draft.content() == "C")
        .times(1)
        .returning(|_, _| {
            let mut article = sample_article(1, 1);
            article.title = "T".into();
            article.content = "C".into();
            Ok(article)
        });
    let (service, _, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let article = service
        .create_article(
            &CallContext::background(),
            author_id(1),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect("create succeeds");

    assert_eq!(article.title, "T");
}

#[tokio::test]
async fn create_with_missing_author_is_invalid_argument() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create().never();
    let (service, authors, sleeper) =
        service_with(repo, ScriptedAuthorSource::new(UpstreamOutcome::NotFound));

    let error = service
        .create_article(
            &CallContext::background(),
            author_id(42),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect_err("author missing");

    assert_eq!(error.code(), ErrorCode::InvalidArgument);
    assert_eq!(error.message(), "user with ID 42 not found");
    assert_eq!(authors.call_count(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn create_is_unavailable_after_retries_are_exhausted() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create().never();
    let (service, authors, sleeper) = service_with(
        repo,
        ScriptedAuthorSource::new(UpstreamOutcome::TransientFailure(TransientKind::Timeout)),
    );

    let error = service
        .create_article(
            &CallContext::background(),
            author_id(1),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect_err("upstream down");

    assert_eq!(error.code(), ErrorCode::Unavailable);
    assert_eq!(authors.call_count(), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[tokio::test]
async fn create_recovers_when_a_retry_succeeds() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create()
        .times(1)
        .returning(|_, _| Ok(sample_article(5, 1)));
    let (service, authors, _) = service_with(
        repo,
        ScriptedAuthorSource::always_found().script(
            1,
            vec![
                UpstreamOutcome::TransientFailure(TransientKind::Connection),
                UpstreamOutcome::TransientFailure(TransientKind::Overloaded),
            ],
        ),
    );

    let article = service
        .create_article(
            &CallContext::background(),
            author_id(1),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect("third attempt succeeds");

    assert_eq!(article.id.get(), 5);
    assert_eq!(authors.call_count(), 3);
}

#[tokio::test]
async fn create_with_permanent_upstream_failure_is_internal() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create().never();
    let (service, authors, _) = service_with(
        repo,
        ScriptedAuthorSource::new(UpstreamOutcome::PermanentFailure(
            PermanentKind::UnexpectedStatus(500),
        )),
    );

    let error = service
        .create_article(
            &CallContext::background(),
            author_id(1),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect_err("permanent failure");

    assert_eq!(error.code(), ErrorCode::Internal);
    assert_eq!(authors.call_count(), 1);
}

#[tokio::test]
async fn create_with_cancelled_caller_is_unknown_not_unavailable() {
    let mut repo = MockArticleRepository::new();
    repo.expect_create().never();
    let (service, _, _) = service_with(repo, ScriptedAuthorSource::always_found());
    let ctx = CallContext::background();
    ctx.cancel();

    let error = service
        .create_article(
            &ctx,
            author_id(1),
            ArticleDraft::new("T", "C").expect("valid draft"),
        )
        .await
        .expect_err("cancelled");

    assert_eq!(error.code(), ErrorCode::Unknown);
}

#[tokio::test]
async fn update_keeps_fields_left_empty() {
    let mut repo = repo_returning(sample_article(1, 7));
    repo.expect_update()
        .withf(|id, title, content| id.get() == 1 && title == "Title 1" && content == "X")
        .times(1)
        .returning(|_, title, content| {
            let mut article = sample_article(1, 7);
            article.title = title.to_owned();
            article.content = content.to_owned();
            Ok(article)
        });
    let (service, authors, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let updated = service
        .update_article(
            &CallContext::background(),
            article_id(1),
            ArticlePatch::new(Some(String::new()), Some("X".into())).expect("valid patch"),
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.title, "Title 1");
    assert_eq!(updated.content, "X");
    assert_eq!(authors.call_count(), 0);
}

#[tokio::test]
async fn update_of_missing_article_is_not_found() {
    let mut repo = MockArticleRepository::new();
    repo.expect_get_by_id()
        .returning(|id| Err(ArticleRepositoryError::not_found(id.get())));
    repo.expect_update().never();
    let (service, _, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let error = service
        .update_article(
            &CallContext::background(),
            article_id(3),
            ArticlePatch::new(Some("T".into()), None).expect("valid patch"),
        )
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_returns_the_row_it_removed() {
    let mut repo = repo_returning(sample_article(4, 2));
    repo.expect_delete()
        .withf(|id| id.get() == 4)
        .times(1)
        .returning(|_| Ok(()));
    let (service, authors, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let deleted = service
        .delete_article(&CallContext::background(), article_id(4))
        .await
        .expect("delete succeeds");

    assert_eq!(deleted, sample_article(4, 2));
    assert_eq!(authors.call_count(), 0);
}

#[tokio::test]
async fn delete_of_missing_article_does_not_touch_storage() {
    let mut repo = MockArticleRepository::new();
    repo.expect_get_by_id()
        .returning(|id| Err(ArticleRepositoryError::not_found(id.get())));
    repo.expect_delete().never();
    let (service, _, _) = service_with(repo, ScriptedAuthorSource::always_found());

    let error = service
        .delete_article(&CallContext::background(), article_id(8))
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "article with ID 8 not found");
}

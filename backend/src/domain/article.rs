//! Article aggregate and its author projection.
//!
//! Articles are owned by this service's storage. Authors are not: an
//! [`AuthorView`] is a point-in-time projection fetched from the identity
//! service for one request, and its absence on an [`EnrichedArticle`] is a
//! valid, expected state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised while building article identifiers and inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArticleValidationError {
    /// Article identifiers must be positive and fit in storage.
    #[error("article ID must be positive")]
    InvalidArticleId,
    /// Author identifiers must be positive and fit in storage.
    #[error("author ID must be positive")]
    InvalidAuthorId,
    /// Title missing or blank on create.
    #[error("title is required")]
    EmptyTitle,
    /// Content missing or blank on create.
    #[error("content is required")]
    EmptyContent,
    /// Update carried neither a title nor content.
    #[error("at least title or content must be provided")]
    EmptyPatch,
}

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident, $error:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "i64", into = "i32")]
        pub struct $name(i32);

        impl $name {
            /// Validate a raw identifier.
            pub fn new(raw: i64) -> Result<Self, ArticleValidationError> {
                match i32::try_from(raw) {
                    Ok(value) if value > 0 => Ok(Self(value)),
                    _ => Err(ArticleValidationError::$error),
                }
            }

            /// Storage representation.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ArticleValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(
    /// Positive article identifier assigned by storage.
    ///
    /// # Examples
    /// ```
    /// use article_backend::domain::ArticleId;
    ///
    /// assert_eq!(ArticleId::new(7).map(ArticleId::get), Ok(7));
    /// assert!(ArticleId::new(0).is_err());
    /// ```
    ArticleId,
    InvalidArticleId
);

positive_id!(
    /// Positive identifier of an author held by the identity service.
    AuthorId,
    InvalidAuthorId
);

/// Stored article row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Article {
    /// Storage-assigned identifier.
    pub id: ArticleId,
    /// Non-empty title.
    pub title: String,
    /// Non-empty body.
    pub content: String,
    /// Owning author.
    #[serde(rename = "user_id")]
    pub author_id: AuthorId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

/// Author record projected from the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorView {
    /// Identity-service user identifier.
    pub id: AuthorId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Creation instant reported upstream.
    pub created_at: DateTime<Utc>,
    /// Last update instant reported upstream.
    pub updated_at: DateTime<Utc>,
}

/// Article paired with its author when the lookup succeeded.
///
/// `author` is `None` whenever the lookup did not complete successfully,
/// whatever the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EnrichedArticle {
    /// Stored article.
    #[serde(flatten)]
    pub article: Article,
    /// Author projection, or `null` when degraded.
    pub author: Option<AuthorView>,
}

impl EnrichedArticle {
    /// Attach a successfully fetched author.
    #[must_use]
    pub fn complete(article: Article, author: AuthorView) -> Self {
        Self {
            article,
            author: Some(author),
        }
    }

    /// Return the article without author data.
    #[must_use]
    pub fn degraded(article: Article) -> Self {
        Self {
            article,
            author: None,
        }
    }

    /// Whether the author lookup failed for this article.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.author.is_none()
    }
}

/// Validated input for a new article.
///
/// # Examples
/// ```
/// use article_backend::domain::{ArticleDraft, ArticleValidationError};
///
/// let draft = ArticleDraft::new("Title", "Body").expect("valid draft");
/// assert_eq!(draft.title(), "Title");
/// assert_eq!(
///     ArticleDraft::new(" ", "Body"),
///     Err(ArticleValidationError::EmptyTitle)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    title: String,
    content: String,
}

impl ArticleDraft {
    /// Reject blank titles before blank content.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ArticleValidationError> {
        let title = title.into();
        let content = content.into();
        if title.trim().is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if content.trim().is_empty() {
            return Err(ArticleValidationError::EmptyContent);
        }
        Ok(Self { title, content })
    }

    /// Article title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Article body.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Partial update; an empty or blank field keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePatch {
    title: Option<String>,
    content: Option<String>,
}

impl ArticlePatch {
    /// Build a patch, treating absent, empty and whitespace-only fields alike.
    ///
    /// # Examples
    /// ```
    /// use article_backend::domain::{ArticlePatch, ArticleValidationError};
    ///
    /// assert!(ArticlePatch::new(Some(String::new()), Some("X".into())).is_ok());
    /// assert_eq!(
    ///     ArticlePatch::new(Some(String::new()), None),
    ///     Err(ArticleValidationError::EmptyPatch)
    /// );
    /// ```
    pub fn new(
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Self, ArticleValidationError> {
        let title = title.filter(|value| !value.trim().is_empty());
        let content = content.filter(|value| !value.trim().is_empty());
        if title.is_none() && content.is_none() {
            return Err(ArticleValidationError::EmptyPatch);
        }
        Ok(Self { title, content })
    }

    /// Resolve the `(title, content)` pair to store for `current`.
    #[must_use]
    pub fn apply(&self, current: &Article) -> (String, String) {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| current.title.clone());
        let content = self
            .content
            .clone()
            .unwrap_or_else(|| current.content.clone());
        (title, content)
    }
}

#[cfg(test)]
mod tests {
    //! Validation and patch semantics.

    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stored() -> Article {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid instant");
        Article {
            id: ArticleId::new(1).expect("valid id"),
            title: "Old title".into(),
            content: "Old content".into(),
            author_id: AuthorId::new(9).expect("valid id"),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(i64::from(i32::MAX) + 1)]
    fn ids_reject_non_positive_or_oversized(#[case] raw: i64) {
        assert_eq!(ArticleId::new(raw), Err(ArticleValidationError::InvalidArticleId));
        assert_eq!(AuthorId::new(raw), Err(ArticleValidationError::InvalidAuthorId));
    }

    #[test]
    fn ids_deserialize_through_validation() {
        let parsed: Result<AuthorId, _> = serde_json::from_str("-4");
        assert!(parsed.is_err());
        let parsed: AuthorId = serde_json::from_str("4").expect("positive id");
        assert_eq!(parsed.get(), 4);
    }

    #[rstest]
    #[case("", "body", ArticleValidationError::EmptyTitle)]
    #[case("title", "  ", ArticleValidationError::EmptyContent)]
    #[case("", "", ArticleValidationError::EmptyTitle)]
    fn drafts_require_title_and_content(
        #[case] title: &str,
        #[case] content: &str,
        #[case] expected: ArticleValidationError,
    ) {
        assert_eq!(ArticleDraft::new(title, content), Err(expected));
    }

    #[rstest]
    fn empty_title_keeps_stored_title(stored: Article) {
        let patch = ArticlePatch::new(Some(String::new()), Some("X".into())).expect("valid patch");
        assert_eq!(patch.apply(&stored), ("Old title".to_owned(), "X".to_owned()));
    }

    #[rstest]
    #[case::spaces("   ")]
    #[case::mixed_whitespace(" \t\n")]
    fn blank_title_keeps_stored_title(stored: Article, #[case] blank: &str) {
        let patch = ArticlePatch::new(Some(blank.to_owned()), Some("X".into())).expect("valid patch");
        assert_eq!(patch.apply(&stored), ("Old title".to_owned(), "X".to_owned()));
    }

    #[rstest]
    fn reapplying_a_patch_is_idempotent(mut stored: Article) {
        let patch = ArticlePatch::new(None, Some("X".into())).expect("valid patch");
        let first = patch.apply(&stored);
        stored.title = first.0.clone();
        stored.content = first.1.clone();
        assert_eq!(patch.apply(&stored), first);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(String::new()), Some(String::new()))]
    #[case(Some("  ".to_owned()), Some("\t".to_owned()))]
    #[case(None, Some(" ".to_owned()))]
    fn patch_requires_a_field(#[case] title: Option<String>, #[case] content: Option<String>) {
        assert_eq!(
            ArticlePatch::new(title, content),
            Err(ArticleValidationError::EmptyPatch)
        );
    }

    #[rstest]
    fn enriched_article_flattens_and_nulls_author(stored: Article) {
        let enriched = EnrichedArticle::degraded(stored);
        assert!(enriched.is_degraded());
        let json = serde_json::to_value(&enriched).expect("serialise");
        assert_eq!(json["title"], "Old title");
        assert_eq!(json["user_id"], 9);
        assert!(json["author"].is_null());
    }
}

//! Domain primitives, ports and services.
//!
//! Purpose: hold the article and author model, the transport-agnostic error
//! type, and the enrichment logic that decides when to retry the identity
//! service and when to degrade. Nothing here knows about HTTP, SQL or JWT.
//!
//! Public surface:
//! - [`Article`], [`AuthorView`], [`EnrichedArticle`] and validated inputs.
//! - [`Error`] / [`ErrorCode`], the closed failure taxonomy.
//! - [`CallContext`], the per-request deadline and cancellation scope.
//! - [`RetryPolicy`], bounded exponential backoff for hard preconditions.
//! - [`ArticleService`], implementing the driving ports in [`ports`].

pub mod article;
pub mod article_service;
pub mod call_context;
pub mod error;
pub mod ports;
pub mod retry;

pub use self::article::{
    Article, ArticleDraft, ArticleId, ArticlePatch, ArticleValidationError, AuthorId, AuthorView,
    EnrichedArticle,
};
pub use self::article_service::ArticleService;
pub use self::call_context::{CallContext, Interrupted};
pub use self::error::{Error, ErrorCode};
pub use self::retry::{BackoffSleeper, RetryConfig, RetryPolicy, RetryReport, TokioSleeper};


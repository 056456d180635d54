//! Driven port for looking up authors in the identity service.
//!
//! Adapters never raise transport errors through this port. Every wire
//! delivery, failure or timeout is normalised into an [`UpstreamOutcome`] so
//! that the retry policy and the enrichment orchestrator can decide on retry
//! and degradation without knowing the protocol.

use async_trait::async_trait;

use crate::domain::{AuthorId, AuthorView, CallContext, Interrupted};

/// Retryable failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Connection refused, reset, or otherwise failed in transport.
    Connection,
    /// The per-call deadline elapsed before a response arrived.
    Timeout,
    /// The identity service signalled it is overloaded or unavailable.
    Overloaded,
}

/// Failure classes that a retry cannot fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermanentKind {
    /// Body could not be decoded into an author.
    MalformedResponse,
    /// Unexpected HTTP status.
    UnexpectedStatus(u16),
    /// The identity service rejected the lookup as invalid.
    InvalidArgument,
    /// The identity service reported an internal or unknown failure.
    UpstreamInternal,
}

/// Tagged result of a single author lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// The author exists.
    Found(AuthorView),
    /// The identity service answered authoritatively that the author does
    /// not exist.
    NotFound,
    /// A retry may succeed.
    TransientFailure(TransientKind),
    /// A retry will not help.
    PermanentFailure(PermanentKind),
}

impl UpstreamOutcome {
    /// Only transient failures are worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }

    /// Short label for structured logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
            Self::TransientFailure(TransientKind::Connection) => "transient_connection",
            Self::TransientFailure(TransientKind::Timeout) => "transient_timeout",
            Self::TransientFailure(TransientKind::Overloaded) => "transient_overloaded",
            Self::PermanentFailure(_) => "permanent",
        }
    }
}

/// Port for fetching one author by identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorSource: Send + Sync {
    /// Perform one lookup bounded by the adapter's per-call deadline and the
    /// caller's context, whichever is stricter.
    ///
    /// Returns `Err` only when the caller cancelled or its deadline elapsed;
    /// an adapter's own timeout is a [`TransientKind::Timeout`] outcome.
    async fn fetch_author(
        &self,
        id: AuthorId,
        ctx: &CallContext,
    ) -> Result<UpstreamOutcome, Interrupted>;
}

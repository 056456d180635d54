//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on domain
//! ports, so they can be exercised with in-memory doubles.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::DropGuard;

use crate::domain::CallContext;
use crate::domain::ports::{AccessTokenVerifier, ArticleCommand, ArticleQuery, TokenRevocationList};

/// Default caller deadline applied to each request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub articles: Arc<dyn ArticleCommand>,
    pub articles_query: Arc<dyn ArticleQuery>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
    pub revocations: Arc<dyn TokenRevocationList>,
    request_timeout: Duration,
}

impl HttpState {
    /// Bundle the ports with the default request deadline.
    pub fn new(
        articles: Arc<dyn ArticleCommand>,
        articles_query: Arc<dyn ArticleQuery>,
        tokens: Arc<dyn AccessTokenVerifier>,
        revocations: Arc<dyn TokenRevocationList>,
    ) -> Self {
        Self {
            articles,
            articles_query,
            tokens,
            revocations,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Deadline given to every request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Context for one request.
    ///
    /// The guard cancels the context when dropped. Actix drops the handler
    /// future when the client disconnects, so holding the guard in the
    /// handler propagates the disconnect into in-flight upstream calls and
    /// backoff sleeps.
    pub fn call_context(&self) -> (CallContext, DropGuard) {
        CallContext::scoped(self.request_timeout)
    }
}

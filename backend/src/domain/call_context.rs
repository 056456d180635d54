//! Caller-supplied deadline and cancellation carried into every outbound call.
//!
//! Inbound adapters build one [`CallContext`] per request. Domain services
//! pass it to storage and upstream ports, and the retry policy consults it
//! before each attempt and while sleeping between attempts, so a cancelled
//! or expired caller never waits on further work.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Why a call stopped before producing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The caller cancelled the request.
    #[error("request cancelled by caller")]
    Cancelled,
    /// The caller's deadline elapsed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Deadline and cancellation scope for one request.
///
/// Cloning shares the cancellation token; cancelling any clone cancels them
/// all.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use article_backend::domain::{CallContext, Interrupted};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let ctx = CallContext::with_timeout(Duration::from_secs(1));
/// assert_eq!(ctx.run(async { 5 }).await, Ok(5));
///
/// ctx.cancel();
/// assert_eq!(ctx.run(async { 5 }).await, Err(Interrupted::Cancelled));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Context without a deadline that is never cancelled unless asked.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Context whose deadline is `timeout` from now.
    ///
    /// A timeout too large to represent as an instant leaves the context
    /// without a deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::background().with_deadline(deadline),
            None => Self::background(),
        }
    }

    /// Tighten the deadline; a later deadline than the current one is ignored.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(
            self.deadline
                .map_or(deadline, |current| current.min(deadline)),
        );
        self
    }

    /// Replace the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Return a context that is cancelled when the guard drops.
    ///
    /// Inbound adapters hold the guard for the lifetime of the request so
    /// that abandoning the request cancels any work still referencing the
    /// context.
    #[must_use]
    pub fn scoped(timeout: Duration) -> (Self, DropGuard) {
        let ctx = Self::with_timeout(timeout);
        let guard = ctx.cancellation.clone().drop_guard();
        (ctx, guard)
    }

    /// Absolute deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the caller has cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the caller cancels.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Fail fast when the caller already cancelled or ran out of time.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// The stricter of `now + timeout` and the caller deadline; `None` when
    /// neither is representable.
    #[must_use]
    pub fn bounded_deadline(&self, timeout: Duration) -> Option<Instant> {
        match (Instant::now().checked_add(timeout), self.deadline) {
            (Some(own), Some(caller)) => Some(own.min(caller)),
            (own, caller) => own.or(caller),
        }
    }

    /// Drive `fut` until it completes, the caller cancels, or the deadline
    /// passes. Cancellation wins ties.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
            () = deadline => Err(Interrupted::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

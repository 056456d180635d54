//! Bounded exponential-backoff retry around a single upstream lookup.
//!
//! Only [`UpstreamOutcome::TransientFailure`] is retried. The policy sleeps
//! between attempts through an injected [`BackoffSleeper`] so that tests can
//! observe delays without waiting, and every sleep races the caller's
//! [`CallContext`] so that cancellation aborts the loop immediately.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::call_context::{CallContext, Interrupted};
use super::ports::UpstreamOutcome;

/// Attempt and backoff limits, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based):
    /// `initial_backoff * 2^(attempt - 1)`, capped at `max_backoff`.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    ///
    /// use article_backend::domain::RetryConfig;
    ///
    /// let config = RetryConfig::default();
    /// assert_eq!(config.backoff_for(1), Duration::from_millis(100));
    /// assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    /// assert_eq!(config.backoff_for(10), Duration::from_secs(1));
    /// ```
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(exponent)
            .min(self.max_backoff)
    }
}

/// Async sleeping abstraction for retry backoff.
#[async_trait]
pub trait BackoffSleeper: Send + Sync {
    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl BackoffSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Final outcome of a retried lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport {
    /// Last observed outcome, unchanged in kind.
    pub outcome: UpstreamOutcome,
    /// Attempts performed.
    pub attempts: u32,
}

/// Retry policy for hard-precondition lookups.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Arc<dyn BackoffSleeper>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Policy that sleeps on the tokio timer.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    /// Policy with an injected sleeper.
    #[must_use]
    pub fn with_sleeper(config: RetryConfig, sleeper: Arc<dyn BackoffSleeper>) -> Self {
        Self { config, sleeper }
    }

    /// Configured limits.
    #[must_use]
    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Run `call` until it yields a non-retryable outcome or attempts run out.
    ///
    /// `call` receives the 1-based attempt number. Interruptions from `call`
    /// or from the caller during backoff end the loop with `Err`; they are
    /// never reported as a transient failure.
    pub async fn run<F, Fut>(&self, ctx: &CallContext, mut call: F) -> Result<RetryReport, Interrupted>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<UpstreamOutcome, Interrupted>> + Send,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            ctx.check()?;
            let outcome = call(attempt).await?;
            if !outcome.is_retryable() {
                debug!(attempt, outcome = outcome.label(), "upstream lookup settled");
                return Ok(RetryReport {
                    outcome,
                    attempts: attempt,
                });
            }
            if attempt >= max_attempts {
                warn!(
                    attempt,
                    outcome = outcome.label(),
                    "upstream lookup retries exhausted"
                );
                return Ok(RetryReport {
                    outcome,
                    attempts: attempt,
                });
            }

            let delay = self.config.backoff_for(attempt);
            debug!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                outcome = outcome.label(),
                "transient upstream failure; backing off"
            );
            ctx.run(self.sleeper.sleep(delay)).await?;
            attempt += 1;
        }
    }
}

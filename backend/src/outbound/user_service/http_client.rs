//! Reqwest-backed identity-service client.
//!
//! This adapter owns transport details only: URL construction, per-call
//! deadline, cancellation, and classification of wire results into
//! `UpstreamOutcome`. It never retries; retry decisions belong to the
//! domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use super::dto::{
    CODE_INVALID_ARGUMENT, CODE_NOT_FOUND, CODE_SUCCESS, CODE_UNAVAILABLE, UserEnvelopeDto,
};
use crate::domain::ports::{AuthorSource, PermanentKind, TransientKind, UpstreamOutcome};
use crate::domain::{AuthorId, CallContext, Interrupted};

const HEALTH_PATH: &str = "health/ready";
const KEEPALIVE: Duration = Duration::from_secs(30);

/// Connection settings for [`UserServiceClient`].
#[derive(Debug, Clone)]
pub struct UserServiceClientConfig {
    /// Identity-service base URL, e.g. `http://users:8081`.
    pub base_url: Url,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Per-call deadline, applied as the stricter of itself and the
    /// caller's deadline.
    pub call_timeout: Duration,
}

impl UserServiceClientConfig {
    /// Settings with the default 5s connect and 2s call timeouts.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(2),
        }
    }
}

/// Startup failures for the identity-service connection.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceConnectError {
    /// The HTTP client could not be built.
    #[error("failed to build identity-service client: {0}")]
    Client(#[source] reqwest::Error),
    /// The base URL cannot carry a path.
    #[error("identity-service URL {url} cannot be used as a base")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
    /// The readiness probe could not reach the service.
    #[error("identity service at {url} is unreachable: {source}")]
    Unreachable {
        /// Probed URL.
        url: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Identity-service adapter implementing [`AuthorSource`].
///
/// Holds one keep-alive connection to the service, established eagerly by
/// [`UserServiceClient::connect`].
#[derive(Debug, Clone)]
pub struct UserServiceClient {
    client: Client,
    base_url: Url,
    call_timeout: Duration,
}

impl UserServiceClient {
    /// Build the client without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is unusable or the reqwest client
    /// cannot be constructed.
    pub fn new(config: UserServiceClientConfig) -> Result<Self, UserServiceConnectError> {
        let UserServiceClientConfig {
            mut base_url,
            connect_timeout,
            call_timeout,
        } = config;
        if base_url.cannot_be_a_base() {
            return Err(UserServiceConnectError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(call_timeout)
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(None)
            .tcp_keepalive(KEEPALIVE)
            .build()
            .map_err(UserServiceConnectError::Client)?;
        Ok(Self {
            client,
            base_url,
            call_timeout,
        })
    }

    /// Build the client and establish its connection with a readiness probe.
    ///
    /// Any HTTP response proves the connection; only a transport failure is
    /// fatal.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceConnectError::Unreachable`] when the probe fails
    /// in transport, including the connect timeout.
    pub async fn connect(config: UserServiceClientConfig) -> Result<Self, UserServiceConnectError> {
        let client = Self::new(config)?;
        let url = client.endpoint(HEALTH_PATH)?;
        let response = client
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| UserServiceConnectError::Unreachable {
                url: url.to_string(),
                source,
            })?;
        info!(
            url = %url,
            status = response.status().as_u16(),
            "identity service connection established"
        );
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> Result<Url, UserServiceConnectError> {
        self.base_url
            .join(path)
            .map_err(|_| UserServiceConnectError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })
    }

    async fn request_author(&self, id: AuthorId) -> UpstreamOutcome {
        let Ok(url) = self.endpoint(&format!("api/v1/users/{id}")) else {
            return UpstreamOutcome::PermanentFailure(PermanentKind::InvalidArgument);
        };
        let response = match self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return map_transport_error(&error),
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => classify_response(id, status, body.as_ref()),
            Err(error) => map_transport_error(&error),
        }
    }
}

#[async_trait]
impl AuthorSource for UserServiceClient {
    async fn fetch_author(
        &self,
        id: AuthorId,
        ctx: &CallContext,
    ) -> Result<UpstreamOutcome, Interrupted> {
        ctx.check()?;
        let deadline = ctx.bounded_deadline(self.call_timeout);
        let caller_bound = ctx
            .deadline()
            .zip(deadline)
            .is_some_and(|(caller, bound)| caller <= bound);
        let lookup = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, self.request_author(id)).await,
                None => Ok(self.request_author(id).await),
            }
        };

        tokio::select! {
            biased;
            () = ctx.cancelled() => Err(Interrupted::Cancelled),
            result = lookup => match result {
                Ok(outcome) => {
                    debug!(author_id = %id, outcome = outcome.label(), "author lookup finished");
                    Ok(outcome)
                }
                Err(_) if caller_bound => Err(Interrupted::DeadlineExceeded),
                Err(_) => {
                    debug!(author_id = %id, "author lookup hit per-call deadline");
                    Ok(UpstreamOutcome::TransientFailure(TransientKind::Timeout))
                }
            },
        }
    }
}

fn map_transport_error(error: &reqwest::Error) -> UpstreamOutcome {
    debug!(%error, "identity-service transport failure");
    if error.is_timeout() {
        UpstreamOutcome::TransientFailure(TransientKind::Timeout)
    } else if error.is_decode() {
        UpstreamOutcome::PermanentFailure(PermanentKind::MalformedResponse)
    } else {
        UpstreamOutcome::TransientFailure(TransientKind::Connection)
    }
}

/// Classify one delivered response for author `requested`.
///
/// HTTP status decides first; only successful responses are decoded.
fn classify_response(requested: AuthorId, status: StatusCode, body: &[u8]) -> UpstreamOutcome {
    match status {
        StatusCode::NOT_FOUND => return UpstreamOutcome::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            return UpstreamOutcome::TransientFailure(TransientKind::Timeout);
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => {
            return UpstreamOutcome::TransientFailure(TransientKind::Overloaded);
        }
        StatusCode::BAD_REQUEST => {
            return UpstreamOutcome::PermanentFailure(PermanentKind::InvalidArgument);
        }
        _ if !status.is_success() => {
            return UpstreamOutcome::PermanentFailure(PermanentKind::UnexpectedStatus(
                status.as_u16(),
            ));
        }
        _ => {}
    }

    let envelope: UserEnvelopeDto = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(error) => {
            debug!(%error, "identity-service body is not an envelope");
            return UpstreamOutcome::PermanentFailure(PermanentKind::MalformedResponse);
        }
    };
    classify_envelope(requested, envelope)
}

fn classify_envelope(requested: AuthorId, envelope: UserEnvelopeDto) -> UpstreamOutcome {
    match envelope.code.as_str() {
        CODE_SUCCESS => {}
        CODE_NOT_FOUND => return UpstreamOutcome::NotFound,
        CODE_UNAVAILABLE => return UpstreamOutcome::TransientFailure(TransientKind::Overloaded),
        CODE_INVALID_ARGUMENT => {
            return UpstreamOutcome::PermanentFailure(PermanentKind::InvalidArgument);
        }
        other => {
            debug!(code = other, message = %envelope.message, "identity service reported failure");
            return UpstreamOutcome::PermanentFailure(PermanentKind::UpstreamInternal);
        }
    }

    let Some(user) = envelope.into_user() else {
        debug!("identity-service success envelope carries no user");
        return UpstreamOutcome::PermanentFailure(PermanentKind::MalformedResponse);
    };
    match user.into_author(requested) {
        Ok(author) => UpstreamOutcome::Found(author),
        Err(reason) => {
            debug!(%reason, "identity-service user record rejected");
            UpstreamOutcome::PermanentFailure(PermanentKind::MalformedResponse)
        }
    }
}

//! Service settings loaded through OrthoConfig.
//!
//! Values come from CLI flags, `ARTICLES_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence. Everything is
//! optional at the loader level; accessors apply defaults so a missing
//! value and an explicit default behave identically.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::RetryConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_USER_SERVICE_URL: &str = "http://localhost:8081";

/// Invalid or missing settings detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value is absent.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    /// A value could not be parsed.
    #[error("invalid value for `{key}`: {message}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Runtime settings for the article service.
#[derive(Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARTICLES")]
pub struct ServiceSettings {
    /// HTTP listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Pool size.
    pub db_max_connections: Option<u32>,
    /// Idle connections kept open.
    pub db_min_idle: Option<u32>,
    /// Pool checkout and connect timeout in milliseconds.
    pub db_connect_timeout_ms: Option<u64>,
    /// Identity-service base URL.
    pub user_service_url: Option<String>,
    /// Connection timeout for the identity service in milliseconds.
    pub user_service_connect_timeout_ms: Option<u64>,
    /// Per-call deadline for identity-service lookups in milliseconds.
    pub user_service_call_timeout_ms: Option<u64>,
    /// Attempts for author verification on create.
    pub retry_max_attempts: Option<u32>,
    /// First backoff delay in milliseconds.
    pub retry_initial_backoff_ms: Option<u64>,
    /// Backoff ceiling in milliseconds.
    pub retry_max_backoff_ms: Option<u64>,
    /// Caller deadline applied to each inbound request in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// HS256 secret shared with the identity service.
    pub jwt_secret: Option<String>,
    /// Redis URL for the revocation list; absent disables revocation checks.
    pub redis_url: Option<String>,
    /// Graceful shutdown window in seconds.
    pub shutdown_timeout_secs: Option<u64>,
}

impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("user_service_url", &self.user_service_url)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

fn millis(value: Option<u64>, default: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(default))
}

impl ServiceSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                key: "bind_addr",
                message: err.to_string(),
            })
    }

    /// Database URL, if storage should use PostgreSQL.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Pool size, at least one.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(10).max(1)
    }

    /// Idle connections kept.
    pub fn db_min_idle(&self) -> u32 {
        self.db_min_idle.unwrap_or(2)
    }

    /// Pool checkout timeout.
    pub fn db_connect_timeout(&self) -> Duration {
        millis(self.db_connect_timeout_ms, 5_000)
    }

    /// Parsed identity-service base URL.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Invalid`] when the URL does not parse.
    pub fn user_service_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .user_service_url
            .as_deref()
            .unwrap_or(DEFAULT_USER_SERVICE_URL);
        Url::parse(raw).map_err(|err| SettingsError::Invalid {
            key: "user_service_url",
            message: err.to_string(),
        })
    }

    /// Connection timeout for the identity service.
    pub fn user_service_connect_timeout(&self) -> Duration {
        millis(self.user_service_connect_timeout_ms, 5_000)
    }

    /// Per-call deadline for identity-service lookups.
    pub fn user_service_call_timeout(&self) -> Duration {
        millis(self.user_service_call_timeout_ms, 2_000)
    }

    /// Retry schedule for author verification.
    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        RetryConfig {
            max_attempts: self
                .retry_max_attempts
                .unwrap_or(defaults.max_attempts)
                .max(1),
            initial_backoff: self
                .retry_initial_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: self
                .retry_max_backoff_ms
                .map_or(defaults.max_backoff, Duration::from_millis),
        }
    }

    /// Caller deadline for each request.
    pub fn request_timeout(&self) -> Duration {
        millis(self.request_timeout_ms, 10_000)
    }

    /// Signing secret; wiped from the returned copy on drop.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Missing`] when unset or blank.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| Zeroizing::new(secret.to_owned()))
            .ok_or(SettingsError::Missing("jwt_secret"))
    }

    /// Redis URL for revocation checks, if configured.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Graceful shutdown window.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs.unwrap_or(10))
    }
}

//! Redis-backed revocation list.
//!
//! The identity service writes `blacklist:<token>` with a TTL matching the
//! credential's remaining lifetime when a user logs out. This adapter only
//! reads; a present key means the credential is revoked.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::{self, AsyncCommands};
use tracing::warn;

use crate::domain::ports::{TokenRevocationError, TokenRevocationList};

const KEY_PREFIX: &str = "blacklist:";

/// Key the identity service uses for a revoked credential.
///
/// # Examples
/// ```
/// use article_backend::outbound::auth::revocation_key;
///
/// assert_eq!(revocation_key("abc"), "blacklist:abc");
/// ```
#[must_use]
pub fn revocation_key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

/// Connection settings for the revocation store.
#[derive(Debug, Clone)]
pub struct RedisRevocationListConfig {
    url: String,
    max_connections: u32,
    connection_timeout: Duration,
}

impl RedisRevocationListConfig {
    /// Defaults: 8 connections, 2 second checkout timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 8,
            connection_timeout: Duration::from_secs(2),
        }
    }

    /// Override the checkout timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Revocation list reading `blacklist:*` keys from Redis.
#[derive(Clone)]
pub struct RedisRevocationList {
    pool: Pool<RedisConnectionManager>,
}

impl std::fmt::Debug for RedisRevocationList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRevocationList").finish_non_exhaustive()
    }
}

impl RedisRevocationList {
    /// Build the pool and prove connectivity with `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRevocationError::Unavailable`] for an invalid URL or an
    /// unreachable server.
    pub async fn connect(config: RedisRevocationListConfig) -> Result<Self, TokenRevocationError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|err| TokenRevocationError::unavailable(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| TokenRevocationError::unavailable(err.to_string()))?;
        {
            let mut conn = pool
                .get()
                .await
                .map_err(|err| TokenRevocationError::unavailable(err.to_string()))?;
            let _pong: String = redis::cmd("PING")
                .query_async(&mut *conn)
                .await
                .map_err(|err| TokenRevocationError::unavailable(err.to_string()))?;
        }
        Ok(Self { pool })
    }
}

#[async_trait]
impl TokenRevocationList for RedisRevocationList {
    async fn is_revoked(&self, token: &str) -> Result<bool, TokenRevocationError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            warn!(error = %err, "revocation list checkout failed");
            TokenRevocationError::unavailable(err.to_string())
        })?;
        conn.exists(revocation_key(token)).await.map_err(|err| {
            warn!(error = %err, "revocation lookup failed");
            TokenRevocationError::unavailable(err.to_string())
        })
    }
}

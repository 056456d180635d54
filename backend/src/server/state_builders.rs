//! Dependency wiring from settings to handler state.
//!
//! Storage, the identity-service connection and the revocation list are all
//! established here, before the listener binds; any failure aborts startup.

use std::sync::Arc;

use tracing::{info, warn};

use article_backend::domain::ports::{
    ArticleRepository, AuthorSource, NoopTokenRevocationList, TokenRevocationError,
    TokenRevocationList,
};
use article_backend::domain::{ArticleService, RetryPolicy};
use article_backend::inbound::http::state::HttpState;
use article_backend::outbound::auth::{
    JwtAccessTokenVerifier, RedisRevocationList, RedisRevocationListConfig,
};
use article_backend::outbound::persistence::{
    DbPool, DieselArticleRepository, InMemoryArticleRepository, MigrationError, PoolConfig,
    PoolError, run_pending_migrations,
};
use article_backend::outbound::user_service::{
    UserServiceClient, UserServiceClientConfig, UserServiceConnectError,
};
use article_backend::settings::{ServiceSettings, SettingsError};

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Settings are missing or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Schema migrations failed.
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    /// The database pool could not be built.
    #[error(transparent)]
    Database(#[from] PoolError),
    /// The identity service is unreachable.
    #[error(transparent)]
    UserService(#[from] UserServiceConnectError),
    /// The revocation list is unreachable.
    #[error(transparent)]
    Revocation(#[from] TokenRevocationError),
}

async fn build_storage(
    settings: &ServiceSettings,
) -> Result<Arc<dyn ArticleRepository>, StartupError> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; articles are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryArticleRepository::default()));
    };
    run_pending_migrations(url).await?;
    let config = PoolConfig::new(url)
        .with_max_size(settings.db_max_connections())
        .with_min_idle(Some(settings.db_min_idle()))
        .with_connection_timeout(settings.db_connect_timeout());
    let pool = DbPool::new(config).await?;
    info!(max_connections = settings.db_max_connections(), "database pool ready");
    Ok(Arc::new(DieselArticleRepository::new(pool)))
}

async fn build_author_source(
    settings: &ServiceSettings,
) -> Result<Arc<dyn AuthorSource>, StartupError> {
    let config = UserServiceClientConfig {
        base_url: settings.user_service_url()?,
        connect_timeout: settings.user_service_connect_timeout(),
        call_timeout: settings.user_service_call_timeout(),
    };
    let base_url = config.base_url.clone();
    let client = UserServiceClient::connect(config).await?;
    info!(%base_url, "connected to user service");
    Ok(Arc::new(client))
}

async fn build_revocation_list(
    settings: &ServiceSettings,
) -> Result<Arc<dyn TokenRevocationList>, StartupError> {
    let Some(url) = settings.redis_url() else {
        warn!("no Redis configured; revoked tokens are accepted until they expire");
        return Ok(Arc::new(NoopTokenRevocationList));
    };
    let list = RedisRevocationList::connect(RedisRevocationListConfig::new(url)).await?;
    info!("token revocation list ready");
    Ok(Arc::new(list))
}

/// Build every adapter and the handler state.
///
/// # Errors
///
/// Returns [`StartupError`] for the first dependency that cannot be
/// established.
pub async fn build_http_state(settings: &ServiceSettings) -> Result<HttpState, StartupError> {
    let secret = settings.jwt_secret()?;
    let articles = build_storage(settings).await?;
    let authors = build_author_source(settings).await?;
    let revocations = build_revocation_list(settings).await?;

    let service = Arc::new(ArticleService::new(
        articles,
        authors,
        RetryPolicy::new(settings.retry_config()),
    ));
    Ok(HttpState::new(
        service.clone(),
        service,
        Arc::new(JwtAccessTokenVerifier::new(secret)),
        revocations,
    )
    .with_request_timeout(settings.request_timeout()))
}

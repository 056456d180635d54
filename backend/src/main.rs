//! Article service entry point: loads settings, wires adapters, serves HTTP.

mod server;

use std::process::ExitCode;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use article_backend::inbound::http::health::HealthState;
use article_backend::settings::ServiceSettings;

use server::{ServerConfig, StartupError, build_http_state, create_server};

#[derive(Debug, thiserror::Error)]
enum FatalError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("server failed: {0}")]
    Io(#[from] std::io::Error),
}

async fn run() -> Result<(), FatalError> {
    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|err| FatalError::Load(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(StartupError::from)?;
    let http_state = build_http_state(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr).with_shutdown_timeout(settings.shutdown_timeout());
    let server = create_server(health_state.clone(), http_state, config)?;
    info!(%bind_addr, "article service listening");

    // SIGINT and SIGTERM trigger a graceful drain bounded by the shutdown timeout.
    let result = server.await;
    health_state.mark_unhealthy();
    result?;

    info!("article service stopped");
    Ok(())
}

#[actix_web::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fatal startup error");
            ExitCode::FAILURE
        }
    }
}

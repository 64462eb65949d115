//! Accounts service entry-point: loads settings, prepares persistence and
//! starts the HTTP server.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use accounts::inbound::http::health::HealthState;
use accounts::inbound::http::session_config::fingerprint::key_fingerprint;
use accounts::inbound::http::session_config::{BuildMode, session_settings_from_env};
use accounts::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use accounts::settings::AppSettings;
use server::{AvatarConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let avatars = AvatarConfig::new(settings.avatar_dir())
        .with_public_prefix(settings.avatar_public_prefix())
        .with_max_bytes(settings.avatar_max_bytes().map_err(io::Error::other)?);
    let mut config = ServerConfig::new(session, bind_addr, avatars);

    if let Some(url) = settings.database_url() {
        config = config.with_db_pool(connect_database(url).await?);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("accounts")
            .endpoint("/metrics")
            .build()
    }));

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting accounts server");
    create_server(health_state, config)?.await
}

/// Apply pending migrations, then open the async pool.
async fn connect_database(url: &str) -> io::Result<DbPool> {
    let migration_url = url.to_owned();
    web::block(move || run_pending_migrations(&migration_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;
    DbPool::new(PoolConfig::new(url))
        .await
        .map_err(io::Error::other)
}

/// Build Prometheus middleware, logging and continuing without metrics on failure.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "metrics initialisation failed; continuing without /metrics");
            None
        }
    }
}

//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contract_workflow::config::AppSettings;
use contract_workflow::inbound::http::health::HealthState;
use contract_workflow::inbound::http::session_config::{BuildMode, session_settings_from_env};
use contract_workflow::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load_from_iter(std::env::args_os()).wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_demo_data(settings.seed_demo_data)
    .with_auto_provision(settings.auto_provision);
    if let Some(url) = settings.database_url() {
        config = config.with_db_pool(connect(url, settings.db_pool_size()?).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(%bind_addr, "serving");
    server.await?;
    Ok(())
}

/// Bring the schema up to date, then open the pool.
async fn connect(database_url: &str, max_size: u32) -> Result<DbPool> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database schema up to date");
    DbPool::new(PoolConfig::new(database_url).with_max_size(max_size))
        .await
        .wrap_err("failed to build database pool")
}

//! Backend entry-point: loads settings, migrates the database and serves the
//! REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use wies::inbound::http::health::HealthState;
use wies::inbound::http::session_config::{BuildMode, key_fingerprint, session_settings_from_env};
use wies::inbound::http::state::HttpOptions;
use wies::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use wies::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    run_migrations(settings.database_url())
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(settings.database_url()).with_max_size(settings.pool_size()))
        .await
        .map_err(|err| std::io::Error::other(err.into_message()))?;

    if settings.dev_login {
        warn!("development login enabled; any known e-mail address can sign in");
    }
    let options = HttpOptions {
        allowed_email_domains: settings.allowed_email_domains(),
        dev_login: settings.dev_login,
    };
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        pool,
    )
    .with_options(options);

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}

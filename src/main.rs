mod config;
mod pages;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use config::{ConfigError, DescopeConfig, ServerConfig};
use services::descope::DescopeClient;
use services::provider::ProviderError;
use services::session::{SessionStore, spawn_session_sweeper};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("identity provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // A missing .env file is fine; a malformed one is reported once logging is up.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Some(e) = config::dotenv_failure(dotenv) {
        tracing::warn!(error = %e, "failed to load .env");
    }

    let server = ServerConfig::from_env()?;
    let descope = DescopeConfig::from_env(server.port)?;
    let server = server.with_cookie_secure_for(&descope.redirect_uri);

    let provider = DescopeClient::new(descope)?;
    tracing::info!(project_id = provider.project_id(), "descope client initialized");

    let sessions = SessionStore::new(server.session_idle);
    let _sweeper = spawn_session_sweeper(sessions.clone(), server.session_sweep);

    let state = state::AppState::new(Arc::new(provider), sessions, server.cookie_secure);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port)).await?;

    tracing::info!(port = server.port, "descope-demo listening");
    axum::serve(listener, app).await?;
    Ok(())
}

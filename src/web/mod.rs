pub(crate) mod auth;
mod handlers;
mod router;

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::platforms::http_client;
use crate::session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: Arc<SessionKeys>,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let keys = SessionKeys::new(
            &config.auth_secret,
            config.admin_email.clone(),
            config.admin_password.clone(),
        );
        Self {
            config: Arc::new(config),
            keys: Arc::new(keys),
            http: http_client(),
        }
    }
}

pub use router::build_router;

/// Binds the configured address and serves the API until the process is
/// stopped.
pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("eventfan API running at http://{addr}");
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}

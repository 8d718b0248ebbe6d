//! Terminal client for the taskdeck API
//!
//! Renders the task list behind a login gate and keeps the local stores
//! in sync with the server.

mod app;
mod config;
mod notify;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_client::{ApiClient, ApiConfig, TaskApi};
use td_core::session::SessionStore;

use crate::app::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;

    // Log to a file; stdout belongs to the terminal UI.
    let file_appender = tracing_appender::rolling::never(&config.data_dir, "task-tui.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_tui=debug,api_client=debug,td_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    tracing::info!("Using data directory: {:?}", config.data_dir);
    tracing::info!("Using API endpoint: {}", config.api_url);

    let session = SessionStore::load(config.token_path())
        .await
        .context("Failed to load session state")?;
    let api: Arc<dyn TaskApi> =
        Arc::new(ApiClient::new(ApiConfig::new(&config.api_url), session.clone()));

    let terminal = ratatui::init();
    let result = App::new(api, session).run(terminal).await;
    ratatui::restore();
    result
}

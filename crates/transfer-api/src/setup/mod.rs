//! Application setup and initialization

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use std::sync::Arc;
use transfer_core::Config;
use transfer_processing::DocumentRenderer;
use transfer_services::{EmailLogo, MailTransport, NotificationDispatcher, SmtpMailTransport};

use crate::services::session_cleanup::SessionCleanupService;
use crate::state::AppState;

/// Initialize the application: renderer, SMTP transport, state and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        facility = %config.facility_email(),
        access_keys = config.access_keys().len(),
        "Configuration loaded and validated successfully"
    );

    let transport = SmtpMailTransport::from_config(&config)
        .context("Failed to initialize SMTP transport")?;

    let state = build_state(config, Arc::new(transport)).await?;

    Arc::new(SessionCleanupService::new(state.sessions.clone())).start();
    tracing::info!(
        idle_timeout_secs = state.config.session_idle_timeout().as_secs(),
        max_sessions = state.config.max_sessions(),
        "Started idle session cleanup background task"
    );

    let router = routes::setup_routes(&state.config, state.clone());

    Ok((state, router))
}

/// Build the shared state around any mail transport.
pub async fn build_state(
    config: Config,
    transport: Arc<dyn MailTransport>,
) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(config.output_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.output_dir().display()
            )
        })?;

    let renderer = DocumentRenderer::from_logo_path(config.pdf_logo_path())
        .context("Failed to load PDF logo")?;

    let email_logo = match config.email_logo_path() {
        Some(path) => Some(EmailLogo::load(path).await.with_context(|| {
            format!("Failed to load e-mail logo {}", path.display())
        })?),
        None => None,
    };

    let dispatcher = NotificationDispatcher::new(transport, config.sender_email());

    Ok(Arc::new(AppState::new(
        Arc::new(config),
        renderer,
        dispatcher,
        email_logo,
    )))
}

//! Join Engine watcher
//!
//! Watches one session from the command line: logs the join button every
//! time it changes and, when asked to, presses it once as soon as it
//! becomes enabled.
//!
//! # Startup Flow
//!
//! 1. Load configuration and the watch target from environment
//! 2. Initialize tracing (text or JSON)
//! 3. Build the HTTP meeting backend and a logging launcher
//! 4. Build the engine and spawn its recompute and status poll tasks
//! 5. Log view changes until Ctrl-C, then cancel the tasks (including an
//!    activation still in flight)

#![warn(clippy::pedantic)]

use std::sync::Arc;

use anyhow::Context;
use join_engine::clock::SystemClock;
use join_engine::config::{Config, LogFormat, WatchTarget};
use join_engine::engine::JoinAvailabilityEngine;
use join_engine::presentation::ButtonView;
use join_engine::services::{HttpMeetingBackend, LoggingLauncher, MeetingOrchestrator};
use join_engine::tasks::EngineTasks;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "join_engine=debug".into()),
    );
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn log_view(view: &ButtonView) {
    info!(
        state = view.state.as_str(),
        label = %view.label,
        disabled = view.disabled,
        error = view.error.as_deref().unwrap_or(""),
        "Join button"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    info!("Starting join engine watcher");

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    let target = WatchTarget::from_env().map_err(|e| {
        error!("Failed to load watch target: {}", e);
        e
    })?;

    info!(
        api_base_url = %config.api_base_url,
        session_id = %target.session_id,
        role = %target.role,
        auto_activate = target.auto_activate,
        "Configuration loaded successfully"
    );

    let backend = HttpMeetingBackend::new(
        &config.api_base_url,
        config.api_token.clone(),
        config.request_timeout,
    )
    .context("failed to build meeting backend")?;
    let orchestrator = MeetingOrchestrator::new(Arc::new(backend), Arc::new(LoggingLauncher));

    let engine = Arc::new(
        JoinAvailabilityEngine::from_session(
            target.to_session(),
            &chrono::Local,
            target.role,
            orchestrator,
            Arc::new(SystemClock),
        )
        .context("failed to build join engine")?,
    );

    let mut tasks = EngineTasks::start(Arc::clone(&engine));
    tasks.attach_status_poller(config.status_poll_interval);

    let mut views = engine.subscribe();
    log_view(&views.borrow_and_update().clone());

    let mut activated = false;
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    warn!("View channel closed");
                    break;
                }
                let view = views.borrow_and_update().clone();
                log_view(&view);

                if target.auto_activate && !activated && !view.disabled {
                    activated = true;
                    tasks.spawn_activation();
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    tasks.shutdown().await;
    info!("Join engine watcher stopped");
    Ok(())
}

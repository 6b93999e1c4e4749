//! Chainwatch Console - Entry Point
//!
//! Connects to the analysis backend and keeps the session alive until
//! interrupted; optionally submits an analysis configured via environment.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod config;
mod error;
mod fetch;
mod protocol;
mod session;
mod ui;

use client::ConnectionManager;
use config::Config;
use fetch::HttpFetcher;
use protocol::AnalysisRequest;
use ui::TerminalUi;

#[tokio::main]
async fn main() -> error::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chainwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chainwatch console");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let ui = Arc::new(TerminalUi::new());
    let fetcher = Arc::new(HttpFetcher::new(config.server.http_url.clone())?);

    // Create the connection manager and its send handle
    let (manager, handle) = ConnectionManager::new(&config, ui, fetcher);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let manager_task = tokio::spawn(manager.run(shutdown_rx));

    info!("Session started - backend: {}", config.server.ws_url);

    // Submit the configured analysis once the submit gate opens.
    if let Some(analysis) = config.analysis.clone() {
        let handle = handle.clone();
        tokio::spawn(async move {
            let request = AnalysisRequest {
                address: analysis.address,
                layers: analysis.layers,
                rto_threshold: analysis.rto_threshold,
                manual: analysis.manual,
            };

            for _ in 0..120 {
                if handle.start_analysis(request.clone()) {
                    info!("Analysis submitted for {}", request.address);
                    return;
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            warn!("Gave up submitting the analysis: session never became ready");
        });
    }

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = manager_task.await;

    info!("Chainwatch console stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

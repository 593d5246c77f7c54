//! Entry point for the `client-vault` service.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Build the field cipher from the configured key.
//! 4. Open the SQLite pool and ensure the `clients` table exists.
//! 5. Build the Axum router and serve until Ctrl-C / SIGTERM.

mod config;
mod crypto;
mod domain;
mod server;
mod store;
mod telemetry;
mod validation;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use crypto::AesFieldCipher;
use server::state::AppState;
use store::ClientStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level, cfg.otlp_endpoint())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_port = cfg.http_port,
        "client-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field cipher
    // -----------------------------------------------------------------------
    let cipher = Arc::new(AesFieldCipher::new(cfg.field_key()?));

    // -----------------------------------------------------------------------
    // 4. Database
    // -----------------------------------------------------------------------
    let pool = store::connect(&cfg.database_url, cfg.database_max_connections)
        .await
        .context("failed to open database")?;
    store::ensure_schema(&pool)
        .await
        .context("failed to create clients table")?;

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(ClientStore::new(pool, cipher), cfg.max_page_size);
    let cors = server::middleware::cors(&cfg.origins())?;
    let router = server::router::build(
        state,
        cors,
        Duration::from_secs(cfg.request_timeout_secs),
    );

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.http_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("client-vault stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

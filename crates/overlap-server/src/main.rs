//! Overlap server entry point.
//!
//! Exposes `POST /psi`, which materializes two base64-encoded CSV
//! datasets and a configuration blob as per-request temporary files,
//! runs the external PSI binary against them, and returns the
//! audience-size / impression pair it reports.

use overlap_core::PsiEngine;
use overlap_server::{http, ServerConfig};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("overlap_server=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Overlap server");

    let config = ServerConfig::from_env();
    tracing::info!(?config, "Configuration loaded");

    // Warn-only validation so development environments without the PSI
    // binary installed can still boot the server.
    config.engine.validate_warn();

    let engine = PsiEngine::new(config.engine)?;

    let shutdown = async {
        let _ = signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
    };

    http::serve(engine, config.http_addr, shutdown).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

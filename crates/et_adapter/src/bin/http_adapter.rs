#![forbid(unsafe_code)]

use std::sync::Arc;

use et_adapter::{build_dispatcher, build_router, AdapterConfig, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AdapterConfig::from_env()?;
    let dispatcher = build_dispatcher(&config)?;
    let app = build_router(AppState::new(Arc::new(dispatcher), config.rollback_timeout));

    info!(
        addr = %config.bind,
        auth_mode = config.auth.mode_name(),
        rollback_timeout_ms = config.rollback_timeout.as_millis() as u64,
        "et_adapter_http listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("et_adapter_http stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

//! HTTP server lifecycle — bind, serve, shut down on ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::router::reparse_router;
use crate::api::types::ApiContext;
use crate::config::ReparseConfig;
use crate::pipeline::orchestrator::Reparser;

/// Bind the configured port and serve until interrupted.
pub async fn serve(config: ReparseConfig, reparser: Arc<Reparser>) -> std::io::Result<()> {
    let ctx = ApiContext::new(reparser, config.api_key.is_some());
    let router = reparse_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, model = %config.model, "reparse server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

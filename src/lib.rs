pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Process entrypoint: configure logging, build the pipeline, serve.
///
/// The reparser (and its blocking HTTP client) is constructed before the
/// async runtime starts; request handlers hand it work through
/// `spawn_blocking`.
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = config::ReparseConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        api_key_configured = cfg.api_key.is_some(),
        model = %cfg.model,
        "starting reparse service"
    );

    let reparser = Arc::new(pipeline::orchestrator::Reparser::from_config(&cfg));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    if let Err(error) = runtime.block_on(api::server::serve(cfg, reparser)) {
        tracing::error!(%error, "server exited with error");
    }
}

mod config;
mod dataset;
mod error;
mod filter;
mod model;
mod prompt;
mod server;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cuet_common::gemini::{GeminiClient, GeminiClientConfig};

use config::Config;
use dataset::ReferenceData;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting cuet-assistant");

    let config = Config::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        cuet_data = %config.cuet_data_path.display(),
        nirf_data = %config.nirf_data_path.display(),
        "configuration loaded"
    );

    let gemini_config = GeminiClientConfig::from_env();
    info!(
        base_url = %gemini_config.base_url,
        model = %gemini_config.model,
        timeout_ms = gemini_config.default_timeout.as_millis(),
        max_retries = gemini_config.max_retries,
        "gemini client configured"
    );
    if gemini_config.api_key.is_none() {
        warn!("GEMINI_API_KEY not set, chat requests will fail until it is configured");
    }
    let gemini = Arc::new(GeminiClient::new(gemini_config).map_err(error::AppError::from)?);

    let data = ReferenceData::load(&config)?;
    info!(
        universities = data.universities.len(),
        rankings = data.rankings.len(),
        "reference data loaded"
    );

    let app = server::router(AppState::new(gemini, data));

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "HTTP server ready");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

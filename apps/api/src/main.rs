mod assessment;
mod config;
mod document;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FitCheck API v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; /analyze will fail upstream authentication");
    }

    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_base.clone(),
        Duration::from_secs(config.gemini_timeout_secs),
        config.gemini_max_retries,
    )
    .context("Failed to build HTTP client")?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s, retries: {})",
        llm_client::MODEL,
        config.gemini_timeout_secs,
        config.gemini_max_retries
    );

    info!(
        "OCR: tesseract={} lang={} pdftoppm={} dpi={} page_failures={:?}",
        config.tesseract_path,
        config.ocr_language,
        config.pdftoppm_path,
        config.ocr_dpi,
        config.ocr_page_failure_policy
    );

    let state = AppState::new(config.clone(), Arc::new(llm));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

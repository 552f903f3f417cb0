//! LabFlow Server
//!
//! Extracts structured exam results from clinical lab reports (PDF or image)
//! using the embedded text layer when it is trustworthy and OCR otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labflow_server::{
    batch::BatchProcessor,
    config::Config,
    extract::ExtractionPipeline,
    ocr::{TesseractProvider, TextRecognizer},
    routes,
    state::AppState,
    structuring::GeminiClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "labflow_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting LabFlow Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Structuring model: {}", config.gemini.model);
    tracing::info!(
        "OCR: {} (lang={}, dpi={})",
        config.ocr.tesseract_cmd,
        config.ocr.language,
        config.ocr.dpi
    );

    if !TesseractProvider::new(&config.ocr).is_available() {
        tracing::warn!(
            "Tesseract not found at '{}'; scanned reports will yield no text",
            config.ocr.tesseract_cmd
        );
    }

    let structurer = GeminiClient::new(config.gemini.clone())
        .context("Failed to initialize structuring client")?;
    let processor = BatchProcessor::new(
        ExtractionPipeline::with_defaults(&config.ocr),
        Arc::new(structurer),
        config.batch.concurrency,
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;

    let app = routes::app(AppState::new(config, processor));

    // Start server with graceful shutdown
    tracing::info!("LabFlow Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

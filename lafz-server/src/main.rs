//! lafz-server - recitation alignment HTTP service
//!
//! Loads the corpus snapshot once, then serves alignment requests until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lafz_common::{Corpus, CorpusIndex};
use lafz_server::config::{ConfigArgs, ServerConfig};
use lafz_server::logging::init_tracing;
use lafz_server::services::AlignmentPipeline;
use lafz_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for lafz-server
#[derive(Parser, Debug)]
#[command(name = "lafz-server")]
#[command(about = "Word-level alignment service for recited audio")]
#[command(version)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(args.config).context("Failed to load configuration")?;

    init_tracing(&config.log_level);

    info!("Starting lafz-server v{}", env!("CARGO_PKG_VERSION"));
    match &config.config_file {
        Some(path) => info!("Loaded TOML configuration from {}", path.display()),
        None => info!("No configuration file found"),
    }
    info!(
        corpus = %config.corpus_path.display(),
        work_dir = %config.work_dir.display(),
        max_upload_mb = config.max_upload_size_mb,
        transcoder = %config.transcoder_binary,
        sample_rate = config.sample_rate,
        aligner = %config.aligner.binary,
        device = %config.aligner.device,
        language = %config.aligner.language,
        romanize = config.aligner.romanize,
        tool_timeout_secs = config.tool_timeout_secs,
        range_policy = %config.range_policy,
        "Configuration resolved"
    );

    let corpus = Corpus::load(&config.corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", config.corpus_path.display()))?;
    let index = Arc::new(CorpusIndex::build(corpus).context("Failed to index corpus")?);
    let stats = index.stats();
    info!(
        chapters = stats.chapters,
        verses = stats.verses,
        words = stats.words,
        word_keys = stats.word_keys,
        "Corpus indexed"
    );

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("Failed to create work directory {}", config.work_dir.display()))?;

    let pipeline = AlignmentPipeline::from_config(index, &config);
    let app = build_router(AppState::new(pipeline), config.max_upload_bytes());

    let addr = config.socket_addr()?;
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

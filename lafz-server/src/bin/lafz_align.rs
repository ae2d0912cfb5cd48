//! lafz-align - align one local recording and print the result
//!
//! Runs the same pipeline as `POST /` without the HTTP layer:
//!
//! ```text
//! lafz-align --audio recitation.mp3 --segments 1:1,1:7 --segments 2:1,2:5
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lafz_common::{Corpus, CorpusIndex};
use lafz_server::api::AlignmentResponse;
use lafz_server::config::{ConfigArgs, ServerConfig};
use lafz_server::logging::init_tracing;
use lafz_server::services::AlignmentPipeline;
use tracing::{info, Instrument};

#[derive(Parser, Debug)]
#[command(name = "lafz-align")]
#[command(about = "Align a local recitation recording against verse ranges")]
#[command(version)]
struct Args {
    /// Audio file to align
    #[arg(long)]
    audio: PathBuf,

    /// Verse range "<start>,<end>", e.g. 1:1,1:7 (repeatable)
    #[arg(long = "segments", required = true)]
    segments: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(args.config).context("Failed to load configuration")?;

    init_tracing(&config.log_level);
    if let Some(path) = &config.config_file {
        info!("Loaded TOML configuration from {}", path.display());
    }

    let corpus = Corpus::load(&config.corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", config.corpus_path.display()))?;
    let index = Arc::new(CorpusIndex::build(corpus).context("Failed to index corpus")?);

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("Failed to create work directory {}", config.work_dir.display()))?;

    let pipeline = AlignmentPipeline::from_config(index, &config);
    let workspace = pipeline.open_workspace().await?;

    tokio::fs::copy(&args.audio, workspace.upload_path())
        .await
        .with_context(|| format!("Failed to read {}", args.audio.display()))?;

    let span = tracing::info_span!("align_request", request_id = %workspace.request_id());
    let records = async {
        info!(audio = %args.audio.display(), segments = args.segments.len(), "Aligning file");
        pipeline.run(&workspace, &args.segments).await
    }
    .instrument(span)
    .await?;

    let response = AlignmentResponse { segments: records };
    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    Ok(())
}

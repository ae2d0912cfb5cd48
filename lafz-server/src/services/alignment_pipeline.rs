//! Per-request alignment pipeline
//!
//! Resolves the requested segments, writes the transcript, transcodes the
//! upload, runs the aligner and maps its segments back onto word keys.
//! Every step either succeeds or aborts the whole request.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lafz_common::{
    map_alignment, CorpusIndex, Error, OutputRecord, RangePolicy, SegmentRequest, SegmentResolver,
    Transcript,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aligner::{Aligner, CtcForcedAligner};
use super::transcoder::{FfmpegTranscoder, Transcoder};
use super::workspace::RequestWorkspace;
use crate::config::ServerConfig;
use crate::error::ApiResult;

/// Request lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Validating,
    PreparingTranscript,
    Transcoding,
    Aligning,
    MappingResults,
    Responding,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Received => "received",
            RequestStage::Validating => "validating",
            RequestStage::PreparingTranscript => "preparing_transcript",
            RequestStage::Transcoding => "transcoding",
            RequestStage::Aligning => "aligning",
            RequestStage::MappingResults => "mapping_results",
            RequestStage::Responding => "responding",
        }
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AlignmentPipeline {
    index: Arc<CorpusIndex>,
    transcoder: Arc<dyn Transcoder>,
    aligner: Arc<dyn Aligner>,
    work_dir: PathBuf,
    range_policy: RangePolicy,
}

impl AlignmentPipeline {
    pub fn new(
        index: Arc<CorpusIndex>,
        transcoder: Arc<dyn Transcoder>,
        aligner: Arc<dyn Aligner>,
        work_dir: PathBuf,
        range_policy: RangePolicy,
    ) -> Self {
        Self {
            index,
            transcoder,
            aligner,
            work_dir,
            range_policy,
        }
    }

    /// Pipeline backed by ffmpeg and ctc-forced-aligner
    pub fn from_config(index: Arc<CorpusIndex>, config: &ServerConfig) -> Self {
        let timeout = config.tool_timeout();
        Self::new(
            index,
            Arc::new(FfmpegTranscoder::new(
                config.transcoder_binary.clone(),
                config.sample_rate,
                timeout,
            )),
            Arc::new(CtcForcedAligner::new(config.aligner.clone(), timeout)),
            config.work_dir.clone(),
            config.range_policy,
        )
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// Fresh workspace under the configured work directory
    pub async fn open_workspace(&self) -> ApiResult<RequestWorkspace> {
        let workspace = RequestWorkspace::create(&self.work_dir, Uuid::new_v4()).await?;
        debug!(stage = %RequestStage::Received, "Request workspace ready");
        Ok(workspace)
    }

    /// Align the upload already stored at `workspace.upload_path()`
    pub async fn run(
        &self,
        workspace: &RequestWorkspace,
        segments: &[String],
    ) -> ApiResult<Vec<OutputRecord>> {
        let mut stage = RequestStage::Validating;
        let result = self.run_stages(workspace, segments, &mut stage).await;

        match &result {
            Ok(records) => info!(words = records.len(), "Alignment complete"),
            Err(e) => warn!(stage = %stage, error = %e, "Alignment failed"),
        }
        result
    }

    async fn run_stages(
        &self,
        workspace: &RequestWorkspace,
        segments: &[String],
        stage: &mut RequestStage,
    ) -> ApiResult<Vec<OutputRecord>> {
        enter(stage, RequestStage::Validating);
        let requests = SegmentRequest::parse_all(segments)?;
        let resolved = SegmentResolver::new(&self.index, self.range_policy).resolve(&requests)?;
        if resolved.is_empty() {
            return Err(Error::Validation("nothing to align".to_string()).into());
        }
        debug!(
            segments = requests.len(),
            verses = resolved.verse_keys.len(),
            words = resolved.word_keys.len(),
            "Segments resolved"
        );

        enter(stage, RequestStage::PreparingTranscript);
        let transcript = Transcript::build(&self.index, &resolved.verse_keys)?;
        if transcript.len() != resolved.word_keys.len() {
            return Err(Error::Mismatch {
                word_keys: resolved.word_keys.len(),
                segments: transcript.len(),
            }
            .into());
        }
        tokio::fs::write(workspace.transcript_path(), transcript.render()).await?;

        enter(stage, RequestStage::Transcoding);
        self.transcoder
            .transcode(&workspace.upload_path(), &workspace.audio_path())
            .await?;

        enter(stage, RequestStage::Aligning);
        let aligned = self
            .aligner
            .align(&workspace.audio_path(), &workspace.transcript_path())
            .await?;

        enter(stage, RequestStage::MappingResults);
        let records = map_alignment(&aligned, &resolved.word_keys)?;

        enter(stage, RequestStage::Responding);
        Ok(records)
    }
}

fn enter(current: &mut RequestStage, next: RequestStage) {
    *current = next;
    debug!(stage = %next, "Request stage");
}

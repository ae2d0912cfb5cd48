//! Forced alignment of transcoded audio against a word transcript

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use lafz_common::alignment::parse_aligner_output;
use lafz_common::AlignedSegment;
use tokio::process::Command;

use super::external_tool::run_tool;
use crate::config::AlignerSettings;
use crate::error::ApiResult;

/// Produces one timed segment per transcript line, in order
#[async_trait]
pub trait Aligner: Send + Sync {
    async fn align(&self, audio: &Path, transcript: &Path) -> ApiResult<Vec<AlignedSegment>>;
}

/// `ctc-forced-aligner` command-line wrapper
///
/// The tool writes its result next to the audio file, with a `.json`
/// extension.
#[derive(Debug, Clone)]
pub struct CtcForcedAligner {
    settings: AlignerSettings,
    timeout: Duration,
}

impl CtcForcedAligner {
    pub fn new(settings: AlignerSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }

    /// Where the tool leaves its output for `audio`
    pub fn output_path(audio: &Path) -> PathBuf {
        audio.with_extension("json")
    }

    fn command(&self, audio: &Path, transcript: &Path) -> Command {
        let mut command = Command::new(&self.settings.binary);
        command
            .arg("--audio_path")
            .arg(audio)
            .arg("--text_path")
            .arg(transcript)
            .arg("--language")
            .arg(&self.settings.language);
        if self.settings.romanize {
            command.arg("--romanize");
        }
        command
            .arg("--preserve_split")
            .arg("True")
            .arg("--device")
            .arg(&self.settings.device);
        command
    }
}

#[async_trait]
impl Aligner for CtcForcedAligner {
    async fn align(&self, audio: &Path, transcript: &Path) -> ApiResult<Vec<AlignedSegment>> {
        tracing::debug!(
            audio = %audio.display(),
            transcript = %transcript.display(),
            device = %self.settings.device,
            "Running forced alignment"
        );
        run_tool(&self.settings.binary, self.command(audio, transcript), self.timeout).await?;

        let raw = tokio::fs::read_to_string(Self::output_path(audio)).await?;
        let segments = parse_aligner_output(&raw)?;

        tracing::debug!(segments = segments.len(), "Aligner output parsed");
        Ok(segments)
    }
}

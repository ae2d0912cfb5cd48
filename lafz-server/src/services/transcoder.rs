//! Audio transcoding to mono PCM at the aligner's sample rate

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::external_tool::run_tool;
use crate::error::ApiResult;

/// Converts an uploaded audio file into the format the aligner consumes
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> ApiResult<()>;
}

/// ffmpeg-backed transcoder
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: String,
    sample_rate: u32,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<String>, sample_rate: u32, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            sample_rate,
            timeout,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-nostdin")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-ac")
            .arg("1")
            .arg(output);
        command
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> ApiResult<()> {
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            sample_rate = self.sample_rate,
            "Transcoding upload"
        );
        run_tool(&self.binary, self.command(input, output), self.timeout).await
    }
}

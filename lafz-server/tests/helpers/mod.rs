//! Shared fixtures for lafz-server integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use lafz_common::{AlignedSegment, Corpus, CorpusIndex, RangePolicy};
use lafz_server::error::{ApiError, ApiResult};
use lafz_server::services::{Aligner, AlignmentPipeline, Transcoder};
use lafz_server::{build_router, AppState};
use serde_json::{json, Value};

pub const BOUNDARY: &str = "lafz-test-boundary";

/// Chapter 1 verses 1-3 and chapter 2 verse 1; the last word of each verse is its marker
pub fn fixture_corpus_json() -> String {
    let verse = |key: &str, words: &[&str]| {
        let words: Vec<Value> = words
            .iter()
            .enumerate()
            .map(|(i, text)| json!({ "position": i + 1, "text_uthmani": text }))
            .collect();
        json!({ "verse_key": key, "words": words })
    };

    json!({
        "chapters": [
            { "id": 1, "verses_count": 3, "name_simple": "Al-Fatihah" },
            { "id": 2, "verses_count": 1, "name_simple": "Al-Baqarah" }
        ],
        "verses": {
            "1:1": verse("1:1", &["بِسْمِ", "ٱللَّهِ", "ٱلرَّحْمَٰنِ", "ٱلرَّحِيمِ", "١"]),
            "1:2": verse("1:2", &["ٱلْحَمْدُ", "لِلَّهِ", "رَبِّ", "ٱلْعَٰلَمِينَ", "٢"]),
            "1:3": verse("1:3", &["ٱلرَّحْمَٰنِ", "ٱلرَّحِيمِ", "٣"]),
            "2:1": verse("2:1", &["الٓمٓ", "١"])
        }
    })
    .to_string()
}

pub fn fixture_index() -> Arc<CorpusIndex> {
    let corpus = Corpus::from_json_str(&fixture_corpus_json()).expect("fixture corpus is valid");
    Arc::new(CorpusIndex::build(corpus).expect("fixture index builds"))
}

/// Copies the upload in place of transcoding
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail: bool,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> ApiResult<()> {
        if self.fail {
            return Err(ApiError::ExternalTool {
                tool: "ffmpeg".to_string(),
                message: "exit status: 1, stderr: Invalid data found when processing input"
                    .to_string(),
            });
        }
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Returns one segment per transcript line, plus `extra_segments`
///
/// Segment `i` spans `[i * 0.5, i * 0.5 + 0.25)` seconds.
#[derive(Default)]
pub struct FakeAligner {
    pub extra_segments: i64,
    pub fail: bool,
    /// Transcript text seen by the last call
    pub transcript: Mutex<Option<String>>,
}

impl FakeAligner {
    pub fn with_extra_segments(extra_segments: i64) -> Self {
        Self {
            extra_segments,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_transcript(&self) -> Option<String> {
        self.transcript.lock().unwrap().clone()
    }
}

#[async_trait]
impl Aligner for FakeAligner {
    async fn align(&self, audio: &Path, transcript: &Path) -> ApiResult<Vec<AlignedSegment>> {
        assert!(audio.exists(), "transcoded audio should exist before alignment");

        let text = tokio::fs::read_to_string(transcript).await?;
        *self.transcript.lock().unwrap() = Some(text.clone());

        if self.fail {
            return Err(ApiError::ExternalTool {
                tool: "ctc-forced-aligner".to_string(),
                message: "exit status: 1, stderr: CUDA out of memory".to_string(),
            });
        }

        let count = (text.lines().count() as i64 + self.extra_segments).max(0);
        Ok((0..count)
            .map(|i| AlignedSegment::new(i as f64 * 0.5, i as f64 * 0.5 + 0.25))
            .collect())
    }
}

pub struct TestApp {
    pub router: Router,
    pub aligner: Arc<FakeAligner>,
    pub work_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new(transcoder: FakeTranscoder, aligner: FakeAligner) -> Self {
        Self::with_options(transcoder, aligner, RangePolicy::Reject, 16 << 20)
    }

    pub fn with_options(
        transcoder: FakeTranscoder,
        aligner: FakeAligner,
        range_policy: RangePolicy,
        max_upload_bytes: usize,
    ) -> Self {
        let work_dir = tempfile::tempdir().expect("temp work dir");
        let aligner = Arc::new(aligner);
        let pipeline = AlignmentPipeline::new(
            fixture_index(),
            Arc::new(transcoder),
            aligner.clone(),
            work_dir.path().to_path_buf(),
            range_policy,
        );

        Self {
            router: build_router(AppState::new(pipeline), max_upload_bytes),
            aligner,
            work_dir,
        }
    }

    /// Request workspaces left behind under the work directory
    pub fn leftover_workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work_dir.path())
            .expect("work dir readable")
            .map(|entry| entry.expect("dir entry").path())
            .collect()
    }
}

/// Multipart POST / with an optional audio file and any number of segment values
pub fn align_request(file: Option<&[u8]>, segments: &[&str]) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"recitation.mp3\"\r\n\
                 Content-Type: audio/mpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    for segment in segments {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"segments\"\r\n\r\n\
                 {segment}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

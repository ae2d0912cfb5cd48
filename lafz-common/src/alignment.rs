//! Aligner output mapping
//!
//! The aligner returns one time-coded segment per transcript line. Segments
//! are paired with the resolved word keys into a [`WordTimeline`] only after
//! the counts agree and every key decodes, so a response is either complete
//! or not produced at all.

use serde::{Deserialize, Serialize, Serializer};

use crate::keys::WordKey;
use crate::{Error, Result};

/// One aligned span as reported by the alignment engine (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AlignedSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub score: Option<f64>,
}

impl AlignedSegment {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            score: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AlignerOutput {
    Wrapped { segments: Vec<AlignedSegment> },
    Bare(Vec<AlignedSegment>),
}

/// Parse aligner JSON, either `{"segments": [...]}` or a bare array
pub fn parse_aligner_output(json: &str) -> Result<Vec<AlignedSegment>> {
    let output: AlignerOutput = serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("malformed aligner output: {}", e)))?;

    Ok(match output {
        AlignerOutput::Wrapped { segments } => segments,
        AlignerOutput::Bare(segments) => segments,
    })
}

/// Millisecond interval, truncated toward zero from seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeSpan {
    pub fn from_seconds(start: f64, end: f64) -> Result<Self> {
        Ok(Self {
            start_ms: seconds_to_ms(start)?,
            end_ms: seconds_to_ms(end)?,
        })
    }
}

fn seconds_to_ms(seconds: f64) -> Result<i64> {
    if !seconds.is_finite() {
        return Err(Error::Parse(format!("non-finite time value {}", seconds)));
    }
    Ok((seconds * 1000.0).trunc() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordTiming {
    pub key: WordKey,
    pub span: TimeSpan,
    pub score: Option<f64>,
}

/// Word keys paired with their aligned spans, in transcript order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordTimeline {
    entries: Vec<WordTiming>,
}

impl WordTimeline {
    /// Pair resolved word keys with aligner segments
    ///
    /// Fails with `Mismatch` before looking at any entry if the counts differ,
    /// and with `Parse` if any key or time is malformed.
    pub fn pair<S: AsRef<str>>(word_keys: &[S], segments: &[AlignedSegment]) -> Result<Self> {
        if word_keys.len() != segments.len() {
            return Err(Error::Mismatch {
                word_keys: word_keys.len(),
                segments: segments.len(),
            });
        }

        let entries = word_keys
            .iter()
            .zip(segments)
            .map(|(key, segment)| {
                Ok(WordTiming {
                    key: key.as_ref().parse()?,
                    span: TimeSpan::from_seconds(segment.start, segment.end)?,
                    score: segment.score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WordTiming] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Response records, numbered from 1
    pub fn records(&self) -> Vec<OutputRecord> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, timing)| OutputRecord {
                sequence: idx + 1,
                start_ms: timing.span.start_ms,
                end_ms: timing.span.end_ms,
                chapter: timing.key.chapter,
                verse: timing.key.verse,
                word: timing.key.word,
            })
            .collect()
    }
}

/// Final response unit, serialized as
/// `[sequence, start_ms, end_ms, chapter, verse, word]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRecord {
    pub sequence: usize,
    pub start_ms: i64,
    pub end_ms: i64,
    pub chapter: u32,
    pub verse: u32,
    pub word: u32,
}

impl Serialize for OutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (
            self.sequence,
            self.start_ms,
            self.end_ms,
            self.chapter,
            self.verse,
            self.word,
        )
            .serialize(serializer)
    }
}

/// Map aligner output onto resolved word keys
pub fn map_alignment<S: AsRef<str>>(
    segments: &[AlignedSegment],
    word_keys: &[S],
) -> Result<Vec<OutputRecord>> {
    Ok(WordTimeline::pair(word_keys, segments)?.records())
}

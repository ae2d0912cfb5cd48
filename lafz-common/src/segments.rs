//! Segment request resolution
//!
//! Turns client range strings (`"<startVerseKey>,<endVerseKey>"`) into the
//! verse-key and word-key sub-sequences a request aligns against. Pairs are
//! processed in the order given and concatenated; overlapping pairs are not
//! deduplicated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::index::CorpusIndex;
use crate::keys::VerseKey;
use crate::{Error, Result};

/// Inclusive verse range requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRequest {
    pub start: VerseKey,
    pub end: VerseKey,
}

impl SegmentRequest {
    pub fn new(start: VerseKey, end: VerseKey) -> Self {
        Self { start, end }
    }

    /// Parse every raw segment value, failing on the first malformed one
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>> {
        raw.iter().map(|s| s.as_ref().parse()).collect()
    }
}

impl fmt::Display for SegmentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

impl FromStr for SegmentRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let (start, end) = match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) => (start.trim(), end.trim()),
            _ => {
                return Err(Error::Validation(format!(
                    "segment '{}' must have the form <startVerseKey>,<endVerseKey>",
                    s
                )))
            }
        };

        let parse = |key: &str| {
            key.parse::<VerseKey>().map_err(|e| {
                Error::Validation(format!("segment '{}' has a malformed verse key: {}", s, e))
            })
        };

        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// What to do with a pair whose endpoints are unknown or reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Fail the request (unknown key → NotFound, reversed → Validation)
    #[default]
    Reject,
    /// Contribute an empty range and keep going
    Skip,
}

impl fmt::Display for RangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangePolicy::Reject => write!(f, "reject"),
            RangePolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for RangePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(RangePolicy::Reject),
            "skip" => Ok(RangePolicy::Skip),
            other => Err(Error::Config(format!(
                "unknown range policy '{}' (expected 'reject' or 'skip')",
                other
            ))),
        }
    }
}

/// Resolved sub-sequences for one request
///
/// `word_keys` is the operative sequence: the transcript has one line per
/// entry and the aligner must return one segment per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSegments {
    pub verse_keys: Vec<String>,
    pub word_keys: Vec<String>,
}

impl ResolvedSegments {
    pub fn is_empty(&self) -> bool {
        self.word_keys.is_empty()
    }
}

pub struct SegmentResolver<'a> {
    index: &'a CorpusIndex,
    policy: RangePolicy,
}

impl<'a> SegmentResolver<'a> {
    pub fn new(index: &'a CorpusIndex, policy: RangePolicy) -> Self {
        Self { index, policy }
    }

    pub fn resolve(&self, requests: &[SegmentRequest]) -> Result<ResolvedSegments> {
        let mut resolved = ResolvedSegments::default();

        for request in requests {
            let start = request.start.to_string();
            let end = request.end.to_string();
            let Some((first, last)) = self.locate(request, &start, &end)? else {
                continue;
            };

            let verse_keys = self.index.verse_keys().range(&start, &end);
            let word_keys = &self.index.word_keys().as_slice()[self.index.word_span(first, last)];

            debug!(
                segment = %request,
                verses = verse_keys.len(),
                words = word_keys.len(),
                "Resolved segment"
            );

            resolved.verse_keys.extend_from_slice(verse_keys);
            resolved.word_keys.extend_from_slice(word_keys);
        }

        Ok(resolved)
    }

    /// Verse positions of the pair's endpoints, or `None` if the pair is skipped
    fn locate(
        &self,
        request: &SegmentRequest,
        start: &str,
        end: &str,
    ) -> Result<Option<(usize, usize)>> {
        let verse_keys = self.index.verse_keys();
        let start = verse_keys.position(start);
        let end = verse_keys.position(end);

        let problem = match (start, end) {
            (Some(s), Some(e)) if s <= e => return Ok(Some((s, e))),
            (Some(_), Some(_)) => Error::Validation(format!(
                "segment '{}' starts after it ends",
                request
            )),
            (None, _) => Error::NotFound(format!("verse {} is not in the corpus", request.start)),
            (_, None) => Error::NotFound(format!("verse {} is not in the corpus", request.end)),
        };

        match self.policy {
            RangePolicy::Reject => Err(problem),
            RangePolicy::Skip => {
                warn!(segment = %request, reason = %problem, "Skipping segment");
                Ok(None)
            }
        }
    }
}

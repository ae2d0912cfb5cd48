//! # Lafz Common Library
//!
//! Corpus indexing and segment mapping shared by the lafz binaries:
//! - Corpus snapshot model and load-time validation
//! - Verse/word key types and ordered key sequences
//! - Segment range resolution
//! - Alignment transcript rendering
//! - Mapping of aligner output back to word identities

pub mod alignment;
pub mod corpus;
pub mod error;
pub mod index;
pub mod keys;
pub mod segments;
pub mod transcript;

pub use alignment::{map_alignment, AlignedSegment, OutputRecord, TimeSpan, WordTimeline};
pub use corpus::Corpus;
pub use error::{Error, Result};
pub use index::CorpusIndex;
pub use keys::{KeySequence, VerseKey, WordKey};
pub use segments::{RangePolicy, ResolvedSegments, SegmentRequest, SegmentResolver};
pub use transcript::Transcript;

//! Common error types for lafz

use thiserror::Error;

/// Common result type for lafz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the corpus index and the segment mapping pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed client input (malformed segment, missing upload, empty range)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Verse key absent from the corpus
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed key or malformed aligner output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Aligner output length disagrees with the resolved word keys
    #[error("Segment count mismatch: {word_keys} word keys but {segments} aligned segments")]
    Mismatch { word_keys: usize, segments: usize },

    /// Corpus snapshot failed load-time validation
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

//! Alignment transcript rendering
//!
//! One spoken word per line, verse order then word order. Line `i` belongs
//! to resolved word key `i`; the aligner echoes segments in line order.

use crate::index::CorpusIndex;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Build the transcript for resolved verse keys
    pub fn build<S: AsRef<str>>(index: &CorpusIndex, verse_keys: &[S]) -> Result<Self> {
        let mut lines = Vec::new();

        for key in verse_keys {
            let key = key.as_ref();
            let words = index
                .spoken_words(key)
                .ok_or_else(|| Error::NotFound(format!("verse {} is not in the corpus", key)))?;
            lines.extend(words.iter().map(|w| w.text_uthmani.clone()));
        }

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-terminated text handed to the aligner
    pub fn render(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

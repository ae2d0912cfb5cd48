//! Global key index over the corpus
//!
//! Flattens chapters → verses → words into two ordered key sequences. The
//! trailing word of each verse is a non-spoken marker and never receives a
//! word key.

use std::ops::Range;

use crate::corpus::{Corpus, Word};
use crate::keys::KeySequence;
use crate::{Error, Result};

/// Verse-key sequence: every verse of every chapter, chapters by ascending ID
pub fn build_verse_key_sequence(corpus: &Corpus) -> Result<KeySequence> {
    KeySequence::from_keys(corpus.verse_keys().map(|key| key.to_string()))
}

/// Word-key sequence in global verse order, skipping each verse's final word
pub fn build_word_key_sequence(corpus: &Corpus) -> Result<KeySequence> {
    let mut keys = Vec::new();

    for verse_key in corpus.verse_keys() {
        let verse = corpus
            .verse(&verse_key.to_string())
            .ok_or_else(|| Error::Corpus(format!("verse {} is missing", verse_key)))?;

        keys.extend(
            verse
                .spoken_words()
                .iter()
                .map(|word| verse_key.word(word.position).to_string()),
        );
    }

    KeySequence::from_keys(keys)
}

/// Counts reported at startup and by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CorpusStats {
    pub chapters: usize,
    pub verses: usize,
    pub words: usize,
    pub word_keys: usize,
}

/// Read-only index built once at startup and shared by all requests
#[derive(Debug)]
pub struct CorpusIndex {
    corpus: Corpus,
    verse_keys: KeySequence,
    word_keys: KeySequence,
    /// Per verse position, the span of its word keys in `word_keys`
    word_spans: Vec<Range<usize>>,
}

impl CorpusIndex {
    pub fn build(corpus: Corpus) -> Result<Self> {
        let verse_keys = build_verse_key_sequence(&corpus)?;
        let word_keys = build_word_key_sequence(&corpus)?;

        let mut word_spans = Vec::with_capacity(verse_keys.len());
        let mut cursor = 0usize;
        for key in verse_keys.iter() {
            let spoken = corpus
                .verse(key)
                .map(|v| v.spoken_words().len())
                .unwrap_or(0);
            word_spans.push(cursor..cursor + spoken);
            cursor += spoken;
        }

        if cursor != word_keys.len() {
            return Err(Error::Corpus(format!(
                "word spans cover {} keys but the word-key sequence has {}",
                cursor,
                word_keys.len()
            )));
        }

        Ok(Self {
            corpus,
            verse_keys,
            word_keys,
            word_spans,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn verse_keys(&self) -> &KeySequence {
        &self.verse_keys
    }

    pub fn word_keys(&self) -> &KeySequence {
        &self.word_keys
    }

    /// Word-key positions covering the verses at positions `first..=last`
    pub fn word_span(&self, first: usize, last: usize) -> Range<usize> {
        self.word_spans[first].start..self.word_spans[last].end
    }

    /// Spoken words of a verse, in position order
    pub fn spoken_words(&self, verse_key: &str) -> Option<&[Word]> {
        self.corpus.verse(verse_key).map(|v| v.spoken_words())
    }

    pub fn stats(&self) -> CorpusStats {
        let words = self
            .verse_keys
            .iter()
            .filter_map(|key| self.corpus.verse(key))
            .map(|v| v.words.len())
            .sum();

        CorpusStats {
            chapters: self.corpus.chapters().len(),
            verses: self.verse_keys.len(),
            words,
            word_keys: self.word_keys.len(),
        }
    }
}

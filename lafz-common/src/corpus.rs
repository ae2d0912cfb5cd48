//! Corpus snapshot model and loader
//!
//! The snapshot is produced by an external ingestion step and treated as
//! immutable input. It is validated once at load so that index construction
//! and every request afterwards can rely on its shape.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::keys::VerseKey;
use crate::{Error, Result};

/// Chapter record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chapter {
    pub id: u32,
    pub verses_count: u32,
    #[serde(default)]
    pub revelation_place: Option<String>,
    #[serde(default)]
    pub revelation_order: Option<u32>,
    #[serde(default)]
    pub bismillah_pre: bool,
    #[serde(default)]
    pub name_simple: Option<String>,
    #[serde(default)]
    pub name_arabic: Option<String>,
}

/// Verse record, keyed by `"chapter:verse"` in the snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Verse {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub verse_key: Option<String>,
    #[serde(default)]
    pub verse_number: Option<u32>,
    #[serde(default)]
    pub juz_number: Option<u32>,
    #[serde(default)]
    pub page_number: Option<u32>,
    /// Absent for verses without a prostration marker
    #[serde(default)]
    pub sajdah_number: Option<u32>,
    pub words: Vec<Word>,
}

impl Verse {
    /// Words that are recited, i.e. every word but the trailing verse-end marker
    pub fn spoken_words(&self) -> &[Word] {
        match self.words.split_last() {
            Some((_, spoken)) => spoken,
            None => &[],
        }
    }
}

/// Word record within a verse
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Word {
    /// 1-based position within the verse
    pub position: u32,
    /// Display text written to the alignment transcript
    #[serde(default)]
    pub text_uthmani: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub char_type_name: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub line_number: Option<u32>,
    #[serde(default)]
    pub page_number: Option<u32>,
}

/// On-disk snapshot layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Snapshot {
    pub chapters: Vec<Chapter>,
    pub verses: HashMap<String, Verse>,
}

/// Validated corpus: chapters sorted by ascending ID, words sorted by position
#[derive(Debug, Clone)]
pub struct Corpus {
    chapters: Vec<Chapter>,
    verses: HashMap<String, Verse>,
}

impl Corpus {
    /// Load and validate a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Corpus(format!("failed to read snapshot {}: {}", path.display(), e))
        })?;
        let corpus = Self::from_json_str(&content)?;

        info!(
            path = %path.display(),
            chapters = corpus.chapters.len(),
            verses = corpus.verses.len(),
            "Loaded corpus snapshot"
        );

        Ok(corpus)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)
            .map_err(|e| Error::Corpus(format!("failed to parse snapshot: {}", e)))?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            mut chapters,
            mut verses,
        } = snapshot;

        chapters.sort_by_key(|c| c.id);

        let mut seen = HashSet::with_capacity(chapters.len());
        for chapter in &chapters {
            if chapter.id == 0 {
                return Err(Error::Corpus("chapter id 0 is not allowed".to_string()));
            }
            if !seen.insert(chapter.id) {
                return Err(Error::Corpus(format!("duplicate chapter id {}", chapter.id)));
            }
        }

        let mut referenced = 0usize;
        for chapter in &chapters {
            for verse_number in 1..=chapter.verses_count {
                let key = VerseKey::new(chapter.id, verse_number).to_string();
                let verse = verses
                    .get_mut(&key)
                    .ok_or_else(|| Error::Corpus(format!("verse {} is missing", key)))?;
                normalize_verse(&key, verse)?;
                referenced += 1;
            }
        }

        if verses.len() > referenced {
            warn!(
                unreferenced = verses.len() - referenced,
                "Snapshot contains verses not referenced by any chapter"
            );
        }

        Ok(Self { chapters, verses })
    }

    /// Chapters in ascending ID order
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn verse(&self, key: &str) -> Option<&Verse> {
        self.verses.get(key)
    }

    /// Verse keys of every chapter in global order
    pub fn verse_keys(&self) -> impl Iterator<Item = VerseKey> + '_ {
        self.chapters.iter().flat_map(|chapter| {
            (1..=chapter.verses_count).map(move |verse| VerseKey::new(chapter.id, verse))
        })
    }
}

fn normalize_verse(key: &str, verse: &mut Verse) -> Result<()> {
    if verse.words.is_empty() {
        return Err(Error::Corpus(format!("verse {} has no words", key)));
    }

    verse.words.sort_by_key(|w| w.position);

    for (idx, word) in verse.words.iter().enumerate() {
        let expected = idx as u32 + 1;
        if word.position != expected {
            return Err(Error::Corpus(format!(
                "verse {} word positions are not contiguous: expected {}, found {}",
                key, expected, word.position
            )));
        }
    }

    for word in verse.spoken_words() {
        if word.text_uthmani.trim().is_empty() {
            return Err(Error::Corpus(format!(
                "word {}:{} has no display text",
                key, word.position
            )));
        }
        if word.text_uthmani.contains(|c| c == '\n' || c == '\r') {
            return Err(Error::Corpus(format!(
                "word {}:{} display text contains a line break",
                key, word.position
            )));
        }
    }

    Ok(())
}

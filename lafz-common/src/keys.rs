//! Verse and word keys, and ordered key sequences
//!
//! Keys travel through the pipeline in their canonical string form
//! (`"chapter:verse"` and `"chapter:verse:word"`). The typed forms exist for
//! parsing client input and for decoding word keys when results are mapped.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Identifier of a verse: `"<chapter>:<verse>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseKey {
    pub fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }

    /// Word key for `word` within this verse
    pub fn word(&self, word: u32) -> WordKey {
        WordKey::new(self.chapter, self.verse, word)
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [chapter, verse] = split_components::<2>(s, "verse key")?;
        Ok(Self { chapter, verse })
    }
}

/// Identifier of a spoken word: `"<chapter>:<verse>:<word>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordKey {
    pub chapter: u32,
    pub verse: u32,
    pub word: u32,
}

impl WordKey {
    pub fn new(chapter: u32, verse: u32, word: u32) -> Self {
        Self { chapter, verse, word }
    }

    pub fn verse_key(&self) -> VerseKey {
        VerseKey::new(self.chapter, self.verse)
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chapter, self.verse, self.word)
    }
}

impl FromStr for WordKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [chapter, verse, word] = split_components::<3>(s, "word key")?;
        Ok(Self { chapter, verse, word })
    }
}

fn split_components<const N: usize>(s: &str, what: &str) -> Result<[u32; N]> {
    let mut out = [0u32; N];
    let mut parts = s.split(':');

    for slot in out.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| Error::Parse(format!("{} '{}' has too few components", what, s)))?;
        *slot = part.trim().parse().map_err(|e| {
            Error::Parse(format!("{} '{}' has non-integer component '{}': {}", what, s, part, e))
        })?;
    }

    if parts.next().is_some() {
        return Err(Error::Parse(format!("{} '{}' has too many components", what, s)));
    }

    Ok(out)
}

/// Ordered, duplicate-free sequence of keys with constant-time position lookup
///
/// Built once from the corpus and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct KeySequence {
    keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl KeySequence {
    /// Build from keys in their global order
    ///
    /// A repeated key means the corpus produced the same identifier twice,
    /// which would make range lookups ambiguous.
    pub fn from_keys<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut positions = HashMap::with_capacity(keys.len());

        for (idx, key) in keys.iter().enumerate() {
            if positions.insert(key.clone(), idx).is_some() {
                return Err(Error::Corpus(format!("duplicate key '{}'", key)));
            }
        }

        Ok(Self { keys, positions })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.keys.iter()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.keys.get(position).map(String::as_str)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Inclusive run of keys between `start` and `end`
    ///
    /// Empty when either endpoint is absent or `start` comes after `end`.
    pub fn range(&self, start: &str, end: &str) -> &[String] {
        match (self.position(start), self.position(end)) {
            (Some(s), Some(e)) if s <= e => &self.keys[s..=e],
            _ => &[],
        }
    }
}

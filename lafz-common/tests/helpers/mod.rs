//! Shared fixtures for lafz-common integration tests

#![allow(dead_code)]

use lafz_common::{Corpus, CorpusIndex};
use serde_json::{json, Map, Value};

/// Build a snapshot where `chapters[i]` lists the word count (marker
/// included) of each verse of chapter `i + 1`.
///
/// Word text is `w<chapter>_<verse>_<position>`, the marker is `#<verse>`.
pub fn snapshot_json(chapters: &[&[u32]]) -> String {
    let mut chapter_records = Vec::new();
    let mut verses = Map::new();

    for (c_idx, verse_word_counts) in chapters.iter().enumerate() {
        let chapter = c_idx as u32 + 1;
        chapter_records.push(json!({
            "id": chapter,
            "verses_count": verse_word_counts.len(),
            "name_simple": format!("Chapter {}", chapter),
        }));

        for (v_idx, &count) in verse_word_counts.iter().enumerate() {
            let verse = v_idx as u32 + 1;
            let words: Vec<Value> = (1..=count)
                .map(|position| {
                    let text = if position == count {
                        format!("#{}", verse)
                    } else {
                        word_text(chapter, verse, position)
                    };
                    json!({ "position": position, "text_uthmani": text, "audio_url": null })
                })
                .collect();

            verses.insert(
                format!("{}:{}", chapter, verse),
                json!({
                    "verse_key": format!("{}:{}", chapter, verse),
                    "verse_number": verse,
                    "sajdah_number": null,
                    "words": words,
                }),
            );
        }
    }

    json!({ "chapters": chapter_records, "verses": verses }).to_string()
}

pub fn word_text(chapter: u32, verse: u32, position: u32) -> String {
    format!("w{}_{}_{}", chapter, verse, position)
}

pub fn build_index(chapters: &[&[u32]]) -> CorpusIndex {
    let corpus = Corpus::from_json_str(&snapshot_json(chapters)).expect("fixture corpus is valid");
    CorpusIndex::build(corpus).expect("fixture index builds")
}

/// Chapter 1: verses with 6, 6, 4 words; chapter 2: verses with 3, 2, 5, 1, 7 words
pub fn sample_index() -> CorpusIndex {
    build_index(&[&[6, 6, 4], &[3, 2, 5, 1, 7]])
}

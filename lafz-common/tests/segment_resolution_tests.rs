//! Integration tests for segment resolution and transcript building
//!
//! Covers:
//! - Single and multi-pair range resolution
//! - Range policy handling of unknown and reversed endpoints
//! - Transcript line / word key correspondence

mod helpers;

use helpers::{sample_index, word_text};
use lafz_common::{Error, RangePolicy, SegmentRequest, SegmentResolver, Transcript};

fn resolve(raw: &[&str], policy: RangePolicy) -> lafz_common::Result<lafz_common::ResolvedSegments> {
    let index = sample_index();
    let requests = SegmentRequest::parse_all(raw)?;
    SegmentResolver::new(&index, policy).resolve(&requests)
}

#[test]
fn test_single_range_within_chapter() {
    let resolved = resolve(&["1:1,1:3"], RangePolicy::Reject).unwrap();

    assert_eq!(resolved.verse_keys, vec!["1:1", "1:2", "1:3"]);
    assert_eq!(resolved.word_keys.len(), 5 + 5 + 3);
    assert_eq!(resolved.word_keys.first().map(String::as_str), Some("1:1:1"));
    assert_eq!(resolved.word_keys.last().map(String::as_str), Some("1:3:3"));
}

#[test]
fn test_single_verse_range() {
    let resolved = resolve(&["2:3,2:3"], RangePolicy::Reject).unwrap();
    assert_eq!(resolved.verse_keys, vec!["2:3"]);
    assert_eq!(resolved.word_keys, vec!["2:3:1", "2:3:2", "2:3:3", "2:3:4"]);
}

#[test]
fn test_range_across_chapters() {
    let resolved = resolve(&["1:3,2:2"], RangePolicy::Reject).unwrap();
    assert_eq!(resolved.verse_keys, vec!["1:3", "2:1", "2:2"]);
    assert_eq!(
        resolved.word_keys,
        vec!["1:3:1", "1:3:2", "1:3:3", "2:1:1", "2:1:2", "2:2:1"]
    );
}

#[test]
fn test_whole_corpus_range() {
    let index = sample_index();
    let resolved = resolve(&["1:1,2:5"], RangePolicy::Reject).unwrap();
    assert_eq!(resolved.verse_keys.len(), index.verse_keys().len());
    assert_eq!(resolved.word_keys.as_slice(), index.word_keys().as_slice());
}

#[test]
fn test_range_ending_on_marker_only_verse() {
    let resolved = resolve(&["2:3,2:4"], RangePolicy::Reject).unwrap();
    assert_eq!(resolved.verse_keys, vec!["2:3", "2:4"]);
    assert_eq!(resolved.word_keys.len(), 4);
}

#[test]
fn test_multiple_pairs_concatenate_in_request_order() {
    let resolved = resolve(&["2:1,2:1", "1:2,1:2", "2:1,2:1"], RangePolicy::Reject).unwrap();

    assert_eq!(resolved.verse_keys, vec!["2:1", "1:2", "2:1"]);
    assert_eq!(
        resolved.word_keys,
        vec![
            "2:1:1", "2:1:2", "1:2:1", "1:2:2", "1:2:3", "1:2:4", "1:2:5", "2:1:1", "2:1:2"
        ]
    );
}

#[test]
fn test_whitespace_and_leading_zeros_accepted() {
    let resolved = resolve(&[" 01:01 , 1:2 "], RangePolicy::Reject).unwrap();
    assert_eq!(resolved.verse_keys, vec!["1:1", "1:2"]);
}

#[test]
fn test_unknown_verse_rejected() {
    let err = resolve(&["1:1,9:9"], RangePolicy::Reject).unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m.contains("9:9")), "{err}");

    let err = resolve(&["1:4,1:5"], RangePolicy::Reject).unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m.contains("1:4")), "{err}");
}

#[test]
fn test_reversed_range_rejected() {
    let err = resolve(&["1:3,1:1"], RangePolicy::Reject).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_skip_policy_contributes_empty_range() {
    let resolved = resolve(&["1:3,1:1", "1:1,9:9", "1:2,1:2"], RangePolicy::Skip).unwrap();
    assert_eq!(resolved.verse_keys, vec!["1:2"]);
    assert_eq!(resolved.word_keys.len(), 5);

    let empty = resolve(&["1:3,1:1"], RangePolicy::Skip).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_malformed_segments_are_validation_errors() {
    for raw in ["1:1", "1:1,1:2,1:3", "1:1,", "a:1,1:2", "1:1:1,1:2", ""] {
        let err = resolve(&[raw], RangePolicy::Skip).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "segment {:?} gave {}", raw, err);
    }
}

#[test]
fn test_transcript_lines_match_word_keys() {
    let index = sample_index();
    let requests = SegmentRequest::parse_all(&["1:2,2:4", "1:1,1:1"]).unwrap();
    let resolved = SegmentResolver::new(&index, RangePolicy::Reject)
        .resolve(&requests)
        .unwrap();

    let transcript = Transcript::build(&index, &resolved.verse_keys).unwrap();
    assert_eq!(transcript.len(), resolved.word_keys.len());

    for (line, key) in transcript.lines().iter().zip(&resolved.word_keys) {
        let key: lafz_common::WordKey = key.parse().unwrap();
        assert_eq!(line, &word_text(key.chapter, key.verse, key.word));
    }

    assert!(!transcript.render().contains('#'), "markers never reach the transcript");
}

#[test]
fn test_transcript_unknown_verse() {
    let index = sample_index();
    let err = Transcript::build(&index, &["7:1"]).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

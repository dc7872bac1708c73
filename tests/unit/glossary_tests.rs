/*!
 * Unit tests for glossary loading and cross-batch matching
 */

use crate::common;
use modloc::app_config::GlossaryMode;
use modloc::glossary::{GlossaryEntry, GlossaryStore, MatchTier};

fn entry(term: &str, translation: &str) -> GlossaryEntry {
    GlossaryEntry {
        term: term.to_string(),
        translation: translation.to_string(),
        variants: Vec::new(),
        abbreviations: Vec::new(),
    }
}

#[test]
fn test_load_fromJsonFile_shouldParseEntries() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "glossary.json",
        r#"[
            {"term": "empire", "translation": "imperium"},
            {"term": "fleet", "translation": "flota", "abbreviations": ["flt"]}
        ]"#,
    )
    .unwrap();

    let store = GlossaryStore::load(&path, GlossaryMode::Loose).unwrap();
    assert_eq!(store.len(), 2);

    let matches = store.match_text("the flt arrives");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].term, "fleet");
    assert_eq!(matches[0].tier, MatchTier::Abbreviation);
}

#[test]
fn test_load_withMalformedJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "glossary.json", "{not json").unwrap();

    assert!(GlossaryStore::load(&path, GlossaryMode::Loose).is_err());
}

#[test]
fn test_matchTexts_shouldKeepHighestConfidencePerEntry() {
    let store = GlossaryStore::from_entries(
        vec![entry("galactic trade federation", "galaktyczna federacja handlowa")],
        GlossaryMode::Loose,
    );

    // The first text only matches partially, the second exactly
    let texts = vec![
        "the trade federation collapsed".to_string(),
        "hail the galactic trade federation".to_string(),
    ];
    let matches = store.match_texts(&texts);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].tier, MatchTier::Exact);
    assert!((matches[0].confidence - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_matchTexts_shouldOrderByConfidenceThenTermLength() {
    let store = GlossaryStore::from_entries(
        vec![
            entry("war", "wojna"),
            entry("war declaration", "wypowiedzenie wojny"),
        ],
        GlossaryMode::Loose,
    );

    let matches = store.match_texts(&["a war declaration arrives".to_string()]);

    assert_eq!(matches.len(), 2);
    // Both are exact; the longer, more specific term comes first
    assert_eq!(matches[0].term, "war declaration");
    assert_eq!(matches[1].term, "war");
}

#[test]
fn test_matchText_strictMode_shouldDisableFuzzyTier() {
    let entries = vec![entry("empire", "imperium")];

    let loose = GlossaryStore::from_entries(entries.clone(), GlossaryMode::Loose);
    let strict = GlossaryStore::from_entries(entries, GlossaryMode::Strict);

    // Mid-word typo: too short a shared prefix for the partial tier, but
    // within the edit-distance budget for a 6-char term
    let text = "the empyre grows";
    assert_eq!(loose.match_text(text).len(), 1);
    assert_eq!(loose.match_text(text)[0].tier, MatchTier::Fuzzy);
    assert!(strict.match_text(text).is_empty());
}

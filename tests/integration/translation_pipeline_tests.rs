/*!
 * End-to-end pipeline tests: extract, translate with a mock provider,
 * reassemble and write the target-language file.
 */

use std::fs;
use std::sync::Arc;

use crate::common::{self, mock_providers::{ScriptedProvider, UppercaseTranslator}};
use modloc::app_config::GlossaryMode;
use modloc::checkpoint::CheckpointStore;
use modloc::extractor;
use modloc::file_utils::FileManager;
use modloc::game_profile::{language_by_code, GameProfile};
use modloc::glossary::{GlossaryEntry, GlossaryStore};
use modloc::providers::ProviderAdapter;
use modloc::reassembler;
use modloc::translation::{BatchScheduler, PromptBuilder, SchedulerOptions};

fn scheduler_with(
    adapter: Arc<dyn ProviderAdapter>,
    glossary: GlossaryStore,
    chunk_size: usize,
) -> BatchScheduler {
    let prompt_builder = PromptBuilder::new(
        GameProfile::for_id("stellaris").unwrap(),
        language_by_code("en").unwrap(),
        language_by_code("pl").unwrap(),
        "",
    );

    BatchScheduler::new(
        adapter,
        CheckpointStore::in_memory().unwrap(),
        Arc::new(glossary),
        prompt_builder,
        SchedulerOptions {
            chunk_size,
            max_retries: 2,
            backoff_secs: 0,
            workers: 1,
        },
    )
}

#[tokio::test]
async fn test_pipeline_withMockProvider_shouldWriteTranslatedFile() {
    common::init_logging();

    let dir = common::create_temp_dir().unwrap();
    let mod_root = common::create_test_mod(&dir).unwrap();
    let loc_dir = mod_root.join("localisation");

    let profile = GameProfile::for_id("stellaris").unwrap();
    let source = language_by_code("en").unwrap();
    let target = language_by_code("pl").unwrap();

    let files = FileManager::find_loc_files(&loc_dir, source).unwrap();
    assert_eq!(files.len(), 1);

    let loc_file = extractor::extract_file(&loc_dir.join(&files[0]), profile).unwrap();
    assert_eq!(loc_file.units.len(), 3);

    let adapter = Arc::new(UppercaseTranslator::new());
    let scheduler = scheduler_with(adapter.clone(), GlossaryStore::empty(), 40);

    let outcome = scheduler
        .translate_file("job-1", "test_l_english.yml", &loc_file.source_texts())
        .await
        .unwrap();
    assert_eq!(outcome.fallback_batches, 0);

    let content =
        reassembler::reassemble(&loc_file, &outcome.texts, source, target, profile).unwrap();
    let bytes = reassembler::encode_output(&content, profile.encoding);

    let out_path = loc_dir.join(FileManager::target_rel_path(&files[0], source, target));
    FileManager::write_bytes(&out_path, &bytes).unwrap();

    assert!(out_path.ends_with("polish/test_l_polish.yml"));
    let written = fs::read(&out_path).unwrap();
    assert_eq!(&written[..3], &[0xEF, 0xBB, 0xBF]);

    let text = String::from_utf8(written[3..].to_vec()).unwrap();
    assert!(text.starts_with("l_polish:\n"));
    assert!(text.contains(" greeting:0 \"HELLO THERE\""));
    assert!(text.contains(" farewell:1 \"GOODBYE FOR NOW\""));
    assert!(text.contains(" title: \"GRAND ADMIRAL\""));
    // Comments and blank lines survive untouched
    assert!(text.contains(" # UI strings\n"));
    assert!(!text.contains("l_english"));
}

#[tokio::test]
async fn test_pipeline_withFencedResponse_shouldRecoverOnRetry() {
    // First reply is unusable prose, the second hides the array in a fence
    let adapter = Arc::new(ScriptedProvider::new(&[
        "Sure! Here are your translations.",
        "```json\n[\"jeden ptak\", \"dwa koty\"]\n```",
    ]));
    let scheduler = scheduler_with(adapter.clone(), GlossaryStore::empty(), 40);

    let sources = vec!["one bird".to_string(), "two cats".to_string()];
    let outcome = scheduler
        .translate_file("job-1", "a.yml", &sources)
        .await
        .unwrap();

    assert_eq!(adapter.call_count(), 2);
    assert_eq!(outcome.fallback_batches, 0);
    assert_eq!(outcome.texts, vec!["jeden ptak", "dwa koty"]);
}

#[tokio::test]
async fn test_pipeline_withTruncatedResponse_shouldRepairJson() {
    // Array cut off mid-string, as a length-limited model would produce
    let adapter = Arc::new(ScriptedProvider::new(&["[\"jeden ptak\", \"dwa kot"]));
    let scheduler = scheduler_with(adapter.clone(), GlossaryStore::empty(), 40);

    let sources = vec!["one bird".to_string(), "two cats".to_string()];
    let outcome = scheduler
        .translate_file("job-1", "a.yml", &sources)
        .await
        .unwrap();

    assert_eq!(adapter.call_count(), 1);
    assert_eq!(outcome.fallback_batches, 0);
    assert_eq!(outcome.texts, vec!["jeden ptak", "dwa kot"]);
}

#[tokio::test]
async fn test_pipeline_withEchoedSources_shouldFallBack() {
    // A model that returns the input untranslated must not be accepted
    let echo = "[\"one bird\", \"two cats\"]";
    let adapter = Arc::new(ScriptedProvider::new(&[echo, echo, echo]));
    let scheduler = scheduler_with(adapter.clone(), GlossaryStore::empty(), 40);

    let sources = vec!["one bird".to_string(), "two cats".to_string()];
    let outcome = scheduler
        .translate_file("job-1", "a.yml", &sources)
        .await
        .unwrap();

    // 1 initial attempt + 2 retries, then the sources pass through
    assert_eq!(adapter.call_count(), 3);
    assert_eq!(outcome.fallback_batches, 1);
    assert_eq!(outcome.texts, sources);
}

#[tokio::test]
async fn test_pipeline_withGlossary_shouldInjectTermsIntoPrompt() {
    let glossary = GlossaryStore::from_entries(
        vec![GlossaryEntry {
            term: "empire".to_string(),
            translation: "imperium".to_string(),
            variants: Vec::new(),
            abbreviations: Vec::new(),
        }],
        GlossaryMode::Loose,
    );

    let adapter = Arc::new(UppercaseTranslator::new());
    let scheduler = scheduler_with(adapter.clone(), glossary, 40);

    scheduler
        .translate_file("job-1", "a.yml", &["the empire expands".to_string()])
        .await
        .unwrap();

    let tracker = adapter.tracker();
    let prompt = tracker.lock().unwrap().last_prompt.clone().unwrap();
    assert!(prompt.contains("- empire -> imperium (exact, 1.00)"));
    assert!(prompt.contains("1. \"the empire expands\""));
}

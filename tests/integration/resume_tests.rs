/*!
 * Checkpoint-based resumption tests: interrupted jobs pick up where they
 * left off, and edited sources invalidate only their own batches.
 */

use std::sync::Arc;

use crate::common::mock_providers::{ScriptedProvider, UppercaseTranslator};
use modloc::app_config::GlossaryMode;
use modloc::checkpoint::CheckpointStore;
use modloc::game_profile::{language_by_code, GameProfile};
use modloc::glossary::GlossaryStore;
use modloc::providers::ProviderAdapter;
use modloc::translation::{BatchScheduler, PromptBuilder, SchedulerOptions};

/// Two-text batches, serialized so the scripted replies land in order
fn scheduler_with(adapter: Arc<dyn ProviderAdapter>, store: CheckpointStore) -> BatchScheduler {
    let prompt_builder = PromptBuilder::new(
        GameProfile::for_id("stellaris").unwrap(),
        language_by_code("en").unwrap(),
        language_by_code("pl").unwrap(),
        "",
    );

    BatchScheduler::new(
        adapter,
        store,
        Arc::new(GlossaryStore::from_entries(Vec::new(), GlossaryMode::Loose)),
        prompt_builder,
        SchedulerOptions {
            chunk_size: 2,
            max_retries: 2,
            backoff_secs: 0,
            workers: 1,
        },
    )
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_resume_afterPartialFailure_shouldOnlyRetranslateFailedBatch() {
    let store = CheckpointStore::in_memory().unwrap();
    let sources = texts(&["a one", "b two", "c three", "d four"]);

    // First run: batch 1 succeeds, then the provider goes down for good
    let flaky = Arc::new(ScriptedProvider::new(&["[\"jeden\", \"dwa\"]"]));
    let first = scheduler_with(flaky.clone(), store.clone());
    let outcome = first.translate_file("job-1", "a.yml", &sources).await.unwrap();

    assert_eq!(outcome.fallback_batches, 1);
    assert_eq!(outcome.texts, vec!["jeden", "dwa", "c three", "d four"]);
    // 1 success + 3 failed attempts for the second batch
    assert_eq!(flaky.call_count(), 4);
    assert_eq!(store.completed_count("job-1").await.unwrap(), 1);

    // Second run: the checkpointed batch is skipped, only batch 2 is sent
    let healthy = Arc::new(UppercaseTranslator::new());
    let second = scheduler_with(healthy.clone(), store.clone());
    let outcome = second.translate_file("job-1", "a.yml", &sources).await.unwrap();

    assert_eq!(healthy.call_count(), 1);
    assert_eq!(outcome.resumed_batches, 1);
    assert_eq!(outcome.fallback_batches, 0);
    assert_eq!(outcome.texts, vec!["jeden", "dwa", "C THREE", "D FOUR"]);
}

#[tokio::test]
async fn test_resume_withEditedSource_shouldInvalidateOnlyItsBatch() {
    let store = CheckpointStore::in_memory().unwrap();
    let sources = texts(&["a one", "b two", "c three", "d four"]);

    let adapter = Arc::new(UppercaseTranslator::new());
    let s = scheduler_with(adapter.clone(), store.clone());
    s.translate_file("job-1", "a.yml", &sources).await.unwrap();
    assert_eq!(adapter.call_count(), 2);

    // Edit a text in the first batch only
    let edited = texts(&["a won", "b two", "c three", "d four"]);

    let adapter2 = Arc::new(UppercaseTranslator::new());
    let s2 = scheduler_with(adapter2.clone(), store.clone());
    let outcome = s2.translate_file("job-1", "a.yml", &edited).await.unwrap();

    // The stale batch is re-translated, the untouched one resumes
    assert_eq!(adapter2.call_count(), 1);
    assert_eq!(outcome.resumed_batches, 1);
    assert_eq!(outcome.texts, vec!["A WON", "B TWO", "C THREE", "D FOUR"]);
}

#[tokio::test]
async fn test_resume_afterCleanup_shouldStartFresh() {
    let store = CheckpointStore::in_memory().unwrap();
    let sources = texts(&["a one", "b two", "c three"]);

    let adapter = Arc::new(UppercaseTranslator::new());
    let s = scheduler_with(adapter.clone(), store.clone());
    s.translate_file("job-1", "a.yml", &sources).await.unwrap();
    assert_eq!(adapter.call_count(), 2);

    // A completed run drops its checkpoint partition
    store.cleanup_job("job-1").await.unwrap();
    assert_eq!(
        store.latest_job_with_prefix("job-").await.unwrap(),
        None
    );

    let adapter2 = Arc::new(UppercaseTranslator::new());
    let s2 = scheduler_with(adapter2.clone(), store);
    let outcome = s2.translate_file("job-1", "a.yml", &sources).await.unwrap();

    assert_eq!(adapter2.call_count(), 2);
    assert_eq!(outcome.resumed_batches, 0);
}

#[tokio::test]
async fn test_resume_acrossDistinctFiles_shouldKeepCheckpointsApart() {
    let store = CheckpointStore::in_memory().unwrap();
    let sources = texts(&["a one", "b two"]);

    let adapter = Arc::new(UppercaseTranslator::new());
    let s = scheduler_with(adapter.clone(), store.clone());
    s.translate_file("job-1", "a.yml", &sources).await.unwrap();

    // Same sources under a different file key must not be considered done
    let adapter2 = Arc::new(UppercaseTranslator::new());
    let s2 = scheduler_with(adapter2.clone(), store);
    let outcome = s2.translate_file("job-1", "b.yml", &sources).await.unwrap();

    assert_eq!(adapter2.call_count(), 1);
    assert_eq!(outcome.resumed_batches, 0);
}

#[test]
fn test_checkpointRows_shouldSurviveStoreClones() {
    tokio_test::block_on(async {
        let store = CheckpointStore::in_memory().unwrap();
        let hash = CheckpointStore::source_hash(&texts(&["x y"]));

        store
            .record_batch("job-1", "a.yml", 0, &hash, &texts(&["z w"]))
            .await
            .unwrap();

        // Clones share the underlying connection
        let clone = store.clone();
        assert_eq!(clone.completed_count("job-1").await.unwrap(), 1);
    });
}

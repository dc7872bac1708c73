/*!
 * Batch scheduling and translation.
 *
 * A file's translatable units are split into fixed-size batches which move
 * through a small lifecycle: pending, dispatched to a provider, then
 * completed (possibly with fallback). Batches run on a bounded worker pool
 * and every successful batch is checkpointed, so an interrupted job picks
 * up where it stopped.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::checkpoint::CheckpointStore;
use crate::glossary::GlossaryStore;
use crate::providers::ProviderAdapter;

use super::prompts::PromptBuilder;
use super::response;

/// Hard ceiling on the worker pool size
const MAX_WORKERS: usize = 32;

/// One batch of source texts awaiting translation
#[derive(Debug, Clone)]
pub struct Batch {
    /// Position of this batch within its file
    pub batch_index: usize,
    /// Source texts, in unit order
    pub texts: Vec<String>,
}

/// Terminal result of a batch, as data rather than control flow
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// All texts translated
    Success(Vec<String>),
    /// Retries exhausted; source texts will be used instead
    Fallback {
        /// Why the batch could not be translated
        reason: String,
    },
}

/// Result of translating one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// One translation per source text, in order (source text on fallback)
    pub texts: Vec<String>,
    /// Total batches the file was split into
    pub total_batches: usize,
    /// Batches restored from the checkpoint store
    pub resumed_batches: usize,
    /// Batches that fell back to their source texts
    pub fallback_batches: usize,
}

/// Tuning knobs for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Source texts per batch
    pub chunk_size: usize,
    /// Retries after the first failed attempt
    pub max_retries: usize,
    /// Base seconds for the linear retry backoff
    pub backoff_secs: u64,
    /// Worker pool size
    pub workers: usize,
}

/// Bounded-concurrency batch translator for a single job
pub struct BatchScheduler {
    adapter: Arc<dyn ProviderAdapter>,
    checkpoint: CheckpointStore,
    glossary: Arc<GlossaryStore>,
    prompt_builder: PromptBuilder,
    options: SchedulerOptions,
}

impl BatchScheduler {
    /// Create a scheduler for one job's fixed parameters
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        checkpoint: CheckpointStore,
        glossary: Arc<GlossaryStore>,
        prompt_builder: PromptBuilder,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            adapter,
            checkpoint,
            glossary,
            prompt_builder,
            options,
        }
    }

    /// Worker pool size for an adapter: `min(32, 2 x cpu)`, forced down to
    /// one for serialized backends
    pub fn worker_count_for(adapter: &dyn ProviderAdapter) -> usize {
        if !adapter.supports_concurrency() {
            return 1;
        }

        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        (cpus * 2).min(MAX_WORKERS)
    }

    /// Split source texts into batches of the configured chunk size
    pub fn split_batches(texts: &[String], chunk_size: usize) -> Vec<Batch> {
        texts
            .chunks(chunk_size.max(1))
            .enumerate()
            .map(|(batch_index, chunk)| Batch {
                batch_index,
                texts: chunk.to_vec(),
            })
            .collect()
    }

    /// Translate all of a file's source texts.
    ///
    /// `file_key` identifies the file inside the checkpoint store and must
    /// be stable across runs (a mod-relative path).
    pub async fn translate_file(
        &self,
        job_id: &str,
        file_key: &str,
        source_texts: &[String],
    ) -> Result<FileOutcome> {
        if source_texts.is_empty() {
            return Ok(FileOutcome {
                texts: Vec::new(),
                total_batches: 0,
                resumed_batches: 0,
                fallback_batches: 0,
            });
        }

        let batches = Self::split_batches(source_texts, self.options.chunk_size);
        let total_batches = batches.len();
        let semaphore = Arc::new(Semaphore::new(self.options.workers));

        // Process batches concurrently
        let results = stream::iter(batches.into_iter())
            .map(|batch| {
                let semaphore = semaphore.clone();
                let job_id = job_id.to_string();
                let file_key = file_key.to_string();

                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");
                    let batch_index = batch.batch_index;
                    let result = self.run_batch(&job_id, &file_key, batch).await;
                    (batch_index, result)
                }
            })
            .buffer_unordered(self.options.workers)
            .collect::<Vec<_>>()
            .await;

        // Sort results by batch index to maintain original order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(idx, _)| *idx);

        let mut texts = Vec::with_capacity(source_texts.len());
        let mut resumed_batches = 0;
        let mut fallback_batches = 0;

        for (batch_index, result) in sorted_results {
            let (outcome, resumed, sources) = result?;

            if resumed {
                resumed_batches += 1;
            }

            match outcome {
                BatchOutcome::Success(translated) => texts.extend(translated),
                BatchOutcome::Fallback { reason } => {
                    fallback_batches += 1;
                    warn!(
                        "Batch {} of {} fell back to source texts: {}",
                        batch_index + 1,
                        file_key,
                        reason
                    );
                    texts.extend(sources);
                }
            }
        }

        info!(
            "{}: {} batch(es), {} resumed, {} fallback",
            file_key, total_batches, resumed_batches, fallback_batches
        );

        Ok(FileOutcome {
            texts,
            total_batches,
            resumed_batches,
            fallback_batches,
        })
    }

    /// Run one batch to its terminal outcome.
    ///
    /// Returns the outcome, whether it was restored from a checkpoint, and
    /// the batch's source texts for fallback use.
    async fn run_batch(
        &self,
        job_id: &str,
        file_key: &str,
        batch: Batch,
    ) -> Result<(BatchOutcome, bool, Vec<String>)> {
        let hash = CheckpointStore::source_hash(&batch.texts);

        // A completed batch with a matching hash is skipped entirely
        match self
            .checkpoint
            .completed_batch(job_id, file_key, batch.batch_index, &hash)
            .await
        {
            Ok(Some(translated)) => {
                debug!(
                    "Batch {} of {} restored from checkpoint",
                    batch.batch_index + 1,
                    file_key
                );
                return Ok((BatchOutcome::Success(translated), true, batch.texts));
            }
            Ok(None) => {}
            Err(e) => {
                // Degrade to re-translating rather than failing the job
                warn!(
                    "Checkpoint lookup failed for batch {} of {}: {}",
                    batch.batch_index + 1,
                    file_key,
                    e
                );
            }
        }

        let matches = self.glossary.match_texts(&batch.texts);
        let prompt = self.prompt_builder.build(&batch.texts, &matches);

        debug!(
            "Dispatching batch {} of {} ({} text(s), {} glossary match(es))",
            batch.batch_index + 1,
            file_key,
            batch.texts.len(),
            matches.len()
        );

        let mut last_error = String::new();
        let attempts = self.options.max_retries + 1;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Linear backoff: attempt x base seconds
                let delay = Duration::from_secs(attempt as u64 * self.options.backoff_secs);
                debug!(
                    "Retrying batch {} of {} in {:?} (attempt {}/{})",
                    batch.batch_index + 1,
                    file_key,
                    delay,
                    attempt + 1,
                    attempts
                );
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            let call_result = self.adapter.call(&prompt).await;

            match call_result {
                Ok(raw) => match response::parse_translations(&raw, &batch.texts) {
                    Ok(translated) => {
                        debug!(
                            "Batch {} of {} completed in {:?}",
                            batch.batch_index + 1,
                            file_key,
                            started.elapsed()
                        );
                        self.checkpoint
                            .record_batch(job_id, file_key, batch.batch_index, &hash, &translated)
                            .await?;
                        return Ok((BatchOutcome::Success(translated), false, batch.texts));
                    }
                    Err(e) => {
                        last_error = e.to_string();
                    }
                },
                Err(e) => {
                    last_error = e.to_string();
                }
            }
        }

        error!(
            "Batch {} of {} exhausted {} attempt(s): {}",
            batch.batch_index + 1,
            file_key,
            attempts,
            last_error
        );

        Ok((
            BatchOutcome::Fallback { reason: last_error },
            false,
            batch.texts,
        ))
    }
}

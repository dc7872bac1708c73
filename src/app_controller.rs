use anyhow::{anyhow, Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::checkpoint::CheckpointStore;
use crate::extractor;
use crate::file_utils::FileManager;
use crate::game_profile::{language_by_code, GameProfile, LanguageSpec};
use crate::glossary::GlossaryStore;
use crate::providers::{create_adapter, ProviderAdapter};
use crate::reassembler;
use crate::translation::{BatchScheduler, PromptBuilder, SchedulerOptions};

// @module: Application controller for mod translation

/// Outcome of one target-language job
#[derive(Debug, Clone)]
pub struct JobSummary {
    /// The job identifier ({mod}-{lang}-{timestamp})
    pub job_id: String,
    /// Target language code
    pub target_language: String,
    /// Localisation files written
    pub files_written: usize,
    /// Files skipped because the output already existed
    pub files_skipped: usize,
    /// Files abandoned after a read or write failure
    pub files_failed: usize,
    /// Files with no translatable content (header-only output)
    pub empty_files: usize,
    /// Translatable units processed
    pub units_total: usize,
    /// Values skipped as untranslatable during extraction
    pub units_skipped: usize,
    /// Batches restored from checkpoints
    pub batches_resumed: usize,
    /// Batches that fell back to their source texts
    pub batches_fallback: usize,
}

impl std::fmt::Display for JobSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} file(s) written, {} skipped, {} failed, {} empty; {} unit(s) ({} skipped); {} batch(es) resumed, {} fallback",
            self.target_language,
            self.files_written,
            self.files_skipped,
            self.files_failed,
            self.empty_files,
            self.units_total,
            self.units_skipped,
            self.batches_resumed,
            self.batches_fallback
        )
    }
}

/// One source file scheduled for translation
#[derive(Debug, Clone)]
struct FileTask {
    /// Absolute path of the source file
    path: PathBuf,
    /// Path relative to its scan root
    rel: PathBuf,
    /// Directory the file was found under
    root: PathBuf,
    /// Scripted-loc `.txt` rather than a localisation yml
    scripted: bool,
}

impl FileTask {
    /// Where the translated twin of this file is written.
    ///
    /// Scripted-loc outputs go under a per-language subfolder of
    /// `customizable_localization`; yml outputs mirror the source layout
    /// with folder and filename markers rewritten.
    fn output_path(&self, source: &LanguageSpec, target: &LanguageSpec) -> PathBuf {
        if self.scripted {
            self.root.join(target.folder_name).join(&self.rel)
        } else {
            self.root
                .join(FileManager::target_rel_path(&self.rel, source, target))
        }
    }

    /// Stable identifier for this file's checkpoint rows
    fn file_key(&self) -> String {
        if self.scripted {
            format!("customizable_localization/{}", self.rel.to_string_lossy())
        } else {
            self.rel.to_string_lossy().to_string()
        }
    }
}

/// Main application controller for mod translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Translate a mod directory into every configured target language.
    ///
    /// A failing target language does not abort the others; the first error
    /// is surfaced after all jobs have run.
    pub async fn run(&self, mod_dir: PathBuf, force_overwrite: bool) -> Result<Vec<JobSummary>> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&mod_dir) {
            return Err(anyhow!("Mod directory does not exist: {:?}", mod_dir));
        }

        let profile = GameProfile::for_id(&self.config.game)?;
        let source = language_by_code(&self.config.source_language)?;

        let loc_dir = mod_dir.join(profile.loc_folder);
        let scripted_dir = mod_dir.join("customizable_localization");
        if !FileManager::dir_exists(&loc_dir) && !FileManager::dir_exists(&scripted_dir) {
            return Err(anyhow!(
                "No {} folder found under {:?}",
                profile.loc_folder,
                mod_dir
            ));
        }

        let mut tasks = Vec::new();

        if FileManager::dir_exists(&loc_dir) {
            for rel in FileManager::find_loc_files(&loc_dir, source)? {
                tasks.push(FileTask {
                    path: loc_dir.join(&rel),
                    rel,
                    root: loc_dir.clone(),
                    scripted: false,
                });
            }
        }

        if FileManager::dir_exists(&scripted_dir) {
            for rel in FileManager::find_scripted_loc_files(&scripted_dir)? {
                tasks.push(FileTask {
                    path: scripted_dir.join(&rel),
                    rel,
                    root: scripted_dir.clone(),
                    scripted: true,
                });
            }
        }

        if tasks.is_empty() {
            warn!(
                "No {} localisation files found under {:?}",
                source.display_name, mod_dir
            );
            return Ok(Vec::new());
        }

        let mod_name = mod_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "mod".to_string());

        info!(
            "Translating '{}' ({}): {} file(s), {} -> [{}]",
            mod_name,
            profile.display_name,
            tasks.len(),
            source.display_name,
            self.config.target_languages.join(", ")
        );

        let glossary = Arc::new(self.load_glossary()?);
        let adapter = self.build_adapter()?;

        adapter
            .initialize()
            .await
            .context("Provider initialization failed")?;

        let store = match &self.config.checkpoint_db {
            Some(path) => CheckpointStore::open(path)?,
            None => CheckpointStore::open_default()?,
        };

        let mut summaries = Vec::new();
        let mut first_error: Option<anyhow::Error> = None;

        for target_code in &self.config.target_languages {
            let target = match language_by_code(target_code) {
                Ok(t) => t,
                Err(e) => {
                    error!("Skipping target '{}': {}", target_code, e);
                    first_error.get_or_insert(e);
                    continue;
                }
            };

            let result = self
                .run_job(
                    &mod_name,
                    &tasks,
                    profile,
                    source,
                    target,
                    adapter.clone(),
                    store.clone(),
                    glossary.clone(),
                    force_overwrite,
                )
                .await;

            match result {
                Ok(summary) => {
                    info!("{}", summary);
                    summaries.push(summary);
                }
                Err(e) => {
                    // Checkpoints for this job are kept for a later resume
                    error!("Job for target '{}' failed: {:#}", target_code, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        info!("Finished in {:?}", start_time.elapsed());

        match first_error {
            Some(e) if summaries.is_empty() => Err(e),
            _ => Ok(summaries),
        }
    }

    /// Run one target-language job over all files
    #[allow(clippy::too_many_arguments)]
    async fn run_job(
        &self,
        mod_name: &str,
        tasks: &[FileTask],
        profile: &'static GameProfile,
        source: &'static LanguageSpec,
        target: &'static LanguageSpec,
        adapter: Arc<dyn ProviderAdapter>,
        store: CheckpointStore,
        glossary: Arc<GlossaryStore>,
        force_overwrite: bool,
    ) -> Result<JobSummary> {
        let job_id = self.resolve_job_id(&store, mod_name, target).await?;

        let prompt_builder =
            PromptBuilder::new(profile, source, target, &self.config.mod_context);

        let options = SchedulerOptions {
            chunk_size: self.config.translation.effective_chunk_size(),
            max_retries: self.config.translation.common.max_retries,
            backoff_secs: self.config.translation.common.retry_backoff_secs,
            workers: BatchScheduler::worker_count_for(adapter.as_ref()),
        };

        info!(
            "Job {}: chunk size {}, {} worker(s)",
            job_id, options.chunk_size, options.workers
        );

        let scheduler = BatchScheduler::new(
            adapter,
            store.clone(),
            glossary,
            prompt_builder,
            options,
        );

        let progress = ProgressBar::new(tasks.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut summary = JobSummary {
            job_id: job_id.clone(),
            target_language: target.code.to_string(),
            files_written: 0,
            files_skipped: 0,
            files_failed: 0,
            empty_files: 0,
            units_total: 0,
            units_skipped: 0,
            batches_resumed: 0,
            batches_fallback: 0,
        };

        for task in tasks {
            progress.set_message(task.rel.to_string_lossy().to_string());

            let out_path = task.output_path(source, target);
            if out_path.exists() && !force_overwrite {
                warn!(
                    "Skipping {:?}, translation already exists (use -f to overwrite)",
                    task.rel
                );
                summary.files_skipped += 1;
                progress.inc(1);
                continue;
            }

            // One broken file must not sink the rest of the job
            if let Err(e) = self
                .process_task(&scheduler, &job_id, task, &out_path, profile, source, target, &mut summary)
                .await
            {
                error!("Failed to process {:?}: {:#}", task.rel, e);
                summary.files_failed += 1;
            }
            progress.inc(1);
        }

        progress.finish_and_clear();

        if summary.files_failed == 0 {
            // The run completed; its checkpoint partition is no longer needed
            store.cleanup_job(&job_id).await?;
        } else {
            warn!(
                "{} file(s) failed; keeping checkpoints for job {}",
                summary.files_failed, job_id
            );
        }

        Ok(summary)
    }

    /// Translate one file end to end: extract, schedule, reassemble, write
    #[allow(clippy::too_many_arguments)]
    async fn process_task(
        &self,
        scheduler: &BatchScheduler,
        job_id: &str,
        task: &FileTask,
        out_path: &Path,
        profile: &'static GameProfile,
        source: &'static LanguageSpec,
        target: &'static LanguageSpec,
        summary: &mut JobSummary,
    ) -> Result<()> {
        let loc_file = extractor::extract_file(&task.path, profile)?;
        summary.units_total += loc_file.units.len();
        summary.units_skipped += loc_file.skipped;

        // A file with nothing to translate still gets its header-only twin
        if loc_file.units.is_empty() {
            summary.empty_files += 1;
        }

        let outcome = scheduler
            .translate_file(job_id, &task.file_key(), &loc_file.source_texts())
            .await?;

        summary.batches_resumed += outcome.resumed_batches;
        summary.batches_fallback += outcome.fallback_batches;

        let content =
            reassembler::reassemble(&loc_file, &outcome.texts, source, target, profile)?;
        let bytes = reassembler::encode_output(&content, profile.encoding);
        FileManager::write_bytes(out_path, &bytes)?;

        summary.files_written += 1;
        Ok(())
    }

    /// Resolve the job id: resume the latest unfinished job for this mod
    /// and target if one left checkpoints behind, otherwise mint a new id.
    async fn resolve_job_id(
        &self,
        store: &CheckpointStore,
        mod_name: &str,
        target: &LanguageSpec,
    ) -> Result<String> {
        let prefix = format!("{}-{}-", mod_name, target.code);

        if let Some(existing) = store.latest_job_with_prefix(&prefix).await? {
            let pending = store.completed_count(&existing).await?;
            info!(
                "Resuming job {} ({} checkpointed batch(es))",
                existing, pending
            );
            return Ok(existing);
        }

        let timestamp = Local::now().format("%Y%m%d%H%M%S");
        Ok(format!("{}{}", prefix, timestamp))
    }

    fn load_glossary(&self) -> Result<GlossaryStore> {
        match &self.config.glossary.path {
            Some(path) => GlossaryStore::load(Path::new(path), self.config.glossary.mode),
            None => Ok(GlossaryStore::empty()),
        }
    }

    fn build_adapter(&self) -> Result<Arc<dyn ProviderAdapter>> {
        let provider_id = self.config.translation.provider.to_lowercase_string();
        let provider_config = self
            .config
            .translation
            .active_provider_config()
            .ok_or_else(|| anyhow!("No configuration for provider '{}'", provider_id))?;

        Ok(create_adapter(
            &provider_id,
            provider_config,
            &self.config.translation.common,
        )?)
    }
}

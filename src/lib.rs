/*!
 * # modloc - Game Mod Localisation Translator
 *
 * A Rust library for translating Paradox-style game mod localisation files
 * using AI.
 *
 * ## Features
 *
 * - Parse `key:0 "value"` localisation files, preserving every byte outside
 *   the quoted values
 * - Translate values using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI-compatible APIs
 *   - Anthropic API
 *   - External CLI tools driven over stdin/stdout
 * - Enforce terminology through a tiered glossary matcher
 * - Checkpoint completed batches in SQLite so interrupted jobs resume
 * - Batch processing with bounded concurrency
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `game_profile`: Per-game conventions (folder names, encodings, prompts)
 * - `extractor`: Localisation file parsing and value extraction
 * - `glossary`: Tiered terminology matching:
 *   - `glossary::matcher`: The match tier cascade
 *   - `glossary::fuzzy`: Edit-distance helpers
 *   - `glossary::store`: Glossary loading and lookup
 * - `translation`: AI-powered translation pipeline:
 *   - `translation::prompts`: Deterministic prompt assembly
 *   - `translation::response`: Response parsing and repair
 *   - `translation::batch`: Batch scheduling with retries and resumption
 * - `checkpoint`: Durable SQLite batch checkpointing
 * - `reassembler`: Byte-precise output file reassembly
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for the LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::cli`: Subprocess-based CLI provider
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod checkpoint;
pub mod errors;
pub mod extractor;
pub mod file_utils;
pub mod game_profile;
pub mod glossary;
pub mod providers;
pub mod reassembler;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, JobSummary};
pub use checkpoint::CheckpointStore;
pub use errors::{AppError, CheckpointError, ExtractionError, ProviderError, TranslationError};
pub use extractor::{LocFile, TranslatableUnit};
pub use game_profile::{GameProfile, LanguageSpec};
pub use glossary::{GlossaryEntry, GlossaryMatch, GlossaryStore, MatchTier};
pub use translation::{BatchScheduler, PromptBuilder};

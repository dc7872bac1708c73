/*!
 * Translation pipeline core.
 *
 * This module turns batches of extracted source texts into translations
 * using a provider adapter. It is split into several submodules:
 *
 * - `prompts`: deterministic prompt assembly
 * - `response`: provider response parsing and repair
 * - `batch`: batch scheduling, retries and checkpoint-aware resumption
 */

// Re-export main types for easier usage
pub use self::batch::{Batch, BatchOutcome, BatchScheduler, FileOutcome, SchedulerOptions};
pub use self::prompts::PromptBuilder;
pub use self::response::parse_translations;

// Submodules
pub mod batch;
pub mod prompts;
pub mod response;

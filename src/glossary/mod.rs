/*!
 * Glossary matching for consistent terminology.
 *
 * - `store`: job-scoped glossary loaded from JSON
 * - `matcher`: tiered matching (exact, variant, abbreviation, partial, fuzzy)
 * - `fuzzy`: Levenshtein distance helpers
 */

pub mod fuzzy;
pub mod matcher;
pub mod store;

pub use matcher::{GlossaryMatch, MatchTier};
pub use store::{GlossaryEntry, GlossaryStore};

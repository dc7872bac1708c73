/*!
 * Glossary storage.
 *
 * A glossary is a JSON list of terms with mandated translations. Every
 * translation job builds its own store instance from the configured file,
 * so two jobs can run with different glossaries or modes side by side.
 */

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::matcher::{self, GlossaryMatch};
use crate::app_config::GlossaryMode;

/// One glossary term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlossaryEntry {
    /// The canonical term as it appears in source texts
    pub term: String,
    /// The translation that must be used for it
    pub translation: String,
    /// Alternative spellings or inflections
    #[serde(default)]
    pub variants: Vec<String>,
    /// Abbreviations that stand for the term
    #[serde(default)]
    pub abbreviations: Vec<String>,
}

/// A job-scoped glossary
#[derive(Debug, Clone)]
pub struct GlossaryStore {
    entries: Vec<GlossaryEntry>,
    mode: GlossaryMode,
}

impl GlossaryStore {
    /// An empty store that matches nothing
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            mode: GlossaryMode::default(),
        }
    }

    /// Build a store from in-memory entries
    pub fn from_entries(entries: Vec<GlossaryEntry>, mode: GlossaryMode) -> Self {
        Self { entries, mode }
    }

    /// Load a store from a glossary JSON file
    pub fn load(path: &Path, mode: GlossaryMode) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {:?}", path))?;

        let entries: Vec<GlossaryEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse glossary file: {:?}", path))?;

        info!(
            "Loaded glossary with {} entries from {:?} ({:?} mode)",
            entries.len(),
            path,
            mode
        );

        Ok(Self { entries, mode })
    }

    /// Number of entries in the store
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find all glossary terms relevant to a source text.
    ///
    /// Each entry contributes at most one match. Results are ordered by
    /// confidence descending, ties broken by term length descending so the
    /// most specific term wins.
    pub fn match_text(&self, text: &str) -> Vec<GlossaryMatch> {
        let mut matches: Vec<GlossaryMatch> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(id, entry)| matcher::match_entry(id, entry, text, self.mode))
            .collect();

        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.term.chars().count().cmp(&a.term.chars().count()))
        });

        matches
    }

    /// Union of matches over several texts, deduplicated per entry.
    ///
    /// When the same entry matches multiple texts, only its highest-confidence
    /// match survives.
    pub fn match_texts(&self, texts: &[String]) -> Vec<GlossaryMatch> {
        let mut best: Vec<Option<GlossaryMatch>> = vec![None; self.entries.len()];

        for text in texts {
            for m in self.match_text(text) {
                let slot = &mut best[m.entry_id];
                let better = slot
                    .as_ref()
                    .is_none_or(|existing| m.confidence > existing.confidence);
                if better {
                    *slot = Some(m);
                }
            }
        }

        let mut matches: Vec<GlossaryMatch> = best.into_iter().flatten().collect();
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.term.chars().count().cmp(&a.term.chars().count()))
        });

        matches
    }
}

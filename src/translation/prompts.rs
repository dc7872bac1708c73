/*!
 * Deterministic prompt assembly.
 *
 * A prompt is built from fixed sections in a fixed order, so the same
 * inputs always produce byte-identical prompts. That makes provider calls
 * reproducible and keeps checkpoint hashes meaningful across runs.
 *
 * Section order: game preamble, mod context, glossary block, format
 * contract with the numbered source list, punctuation rules.
 */

use std::fmt::Write;

use crate::game_profile::{punctuation_map, GameProfile, LanguageSpec};
use crate::glossary::GlossaryMatch;

/// Builds prompts for one (game, language pair, mod) combination
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
    mod_context: String,
    punctuation_rules: Option<String>,
}

impl PromptBuilder {
    /// Create a builder for a job's fixed parameters
    pub fn new(
        profile: &GameProfile,
        source: &LanguageSpec,
        target: &LanguageSpec,
        mod_context: &str,
    ) -> Self {
        Self {
            preamble: profile.render_prompt(source.display_name, target.display_name),
            mod_context: mod_context.trim().to_string(),
            punctuation_rules: punctuation_rules_for(source),
        }
    }

    /// Assemble the full prompt for one batch
    pub fn build(&self, texts: &[String], matches: &[GlossaryMatch]) -> String {
        let mut prompt = String::with_capacity(1024);

        prompt.push_str(&self.preamble);

        if !self.mod_context.is_empty() {
            let _ = write!(
                prompt,
                "\n\nCRITICAL CONTEXT: The mod you are translating is '{}'. \
Use this context to resolve ambiguous terms consistently.",
                self.mod_context
            );
        }

        if !matches.is_empty() {
            prompt.push_str("\n\nUse these mandatory translations for the following terms:");
            for m in matches {
                let _ = write!(
                    prompt,
                    "\n- {} -> {} ({}, {:.2})",
                    m.term,
                    m.translation,
                    m.tier.label(),
                    m.confidence
                );
            }
        }

        let _ = write!(
            prompt,
            "\n\nTranslate the {count} numbered texts below. Respond with ONLY a JSON array \
of exactly {count} strings, in the same order, one translation per input text. \
Do not merge, split, number or annotate the outputs.\n",
            count = texts.len()
        );

        for (i, text) in texts.iter().enumerate() {
            let _ = write!(prompt, "\n{}. \"{}\"", i + 1, text);
        }

        if let Some(rules) = &self.punctuation_rules {
            prompt.push_str("\n\n");
            prompt.push_str(rules);
        }

        prompt
    }
}

/// Render the punctuation instruction block for a source language, if it
/// has a configured punctuation map
fn punctuation_rules_for(source: &LanguageSpec) -> Option<String> {
    let map = punctuation_map(source.code)?;

    let mut rules = String::from(
        "The source text may carry non-ASCII punctuation. Use plain ASCII punctuation \
in your translation, applying these replacements:",
    );
    for (from, to) in map {
        let _ = write!(rules, " {}->{}", from, to);
    }

    Some(rules)
}

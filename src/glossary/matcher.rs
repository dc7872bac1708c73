/*!
 * Tiered glossary matching.
 *
 * Each glossary entry is checked against a source text through a cascade of
 * tiers, from exact containment down to fuzzy token matching. An entry
 * reports at most one match: the highest tier that fires.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::fuzzy;
use super::store::GlossaryEntry;
use crate::app_config::GlossaryMode;

/// Matching tier, ordered from strongest to weakest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Term appears verbatim (case-insensitive)
    Exact,
    /// A listed variant appears verbatim
    Variant,
    /// A listed abbreviation appears as a whole token
    Abbreviation,
    /// A large share of the term's words appear
    Partial,
    /// A token is within edit-distance budget of the term
    Fuzzy,
}

impl MatchTier {
    /// Lowercase tier name, used when matches are surfaced in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Variant => "variant",
            Self::Abbreviation => "abbreviation",
            Self::Partial => "partial",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// A glossary term found in a source text
#[derive(Debug, Clone, PartialEq)]
pub struct GlossaryMatch {
    /// Index of the entry in its store
    pub entry_id: usize,
    /// The canonical term
    pub term: String,
    /// The mandated translation
    pub translation: String,
    /// Tier that produced this match
    pub tier: MatchTier,
    /// Match confidence in [0.0, 1.0]
    pub confidence: f32,
}

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_']+").unwrap());

/// Split a text into tokens: ASCII word runs, plus one token per CJK char
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    tokens.extend(text.chars().filter(|c| is_cjk(*c)).map(|c| c.to_string()));
    tokens
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'      // CJK unified ideographs
        | '\u{3400}'..='\u{4DBF}'    // extension A
        | '\u{3040}'..='\u{30FF}'    // hiragana + katakana
        | '\u{AC00}'..='\u{D7AF}'    // hangul syllables
    )
}

/// Match one entry against a text, returning the strongest firing tier
pub fn match_entry(
    entry_id: usize,
    entry: &GlossaryEntry,
    text: &str,
    mode: GlossaryMode,
) -> Option<GlossaryMatch> {
    let text_lower = text.to_lowercase();
    let term_lower = entry.term.to_lowercase();

    let hit = |tier, confidence| GlossaryMatch {
        entry_id,
        term: entry.term.clone(),
        translation: entry.translation.clone(),
        tier,
        confidence,
    };

    if !term_lower.is_empty() && text_lower.contains(&term_lower) {
        return Some(hit(MatchTier::Exact, 1.0));
    }

    if entry
        .variants
        .iter()
        .any(|v| !v.is_empty() && text_lower.contains(&v.to_lowercase()))
    {
        return Some(hit(MatchTier::Variant, 0.9));
    }

    let tokens = tokenize(text);

    if entry.abbreviations.iter().any(|abbr| {
        !abbr.is_empty() && tokens.iter().any(|t| t.eq_ignore_ascii_case(abbr))
    }) {
        return Some(hit(MatchTier::Abbreviation, 0.85));
    }

    if let Some(share) = partial_share(&term_lower, &text_lower, &tokens) {
        let confidence = (0.7 + 0.2 * share).clamp(0.7, 0.9);
        return Some(hit(MatchTier::Partial, confidence));
    }

    if mode == GlossaryMode::Loose {
        if let Some(distance) = fuzzy::closest_token_distance(&tokens, &entry.term) {
            let confidence = (0.6 - 0.1 * distance as f32).clamp(0.3, 0.6);
            return Some(hit(MatchTier::Fuzzy, confidence));
        }
    }

    None
}

/// Share of the term covered by the text, for the partial tier.
///
/// Only terms longer than 3 chars qualify. Multi-word terms count the
/// character mass of their words present in the text; single-word terms
/// look for a token sharing a long common prefix with the term.
fn partial_share(term_lower: &str, text_lower: &str, tokens: &[String]) -> Option<f32> {
    if term_lower.chars().count() <= 3 {
        return None;
    }

    let words: Vec<&str> = term_lower.split_whitespace().collect();

    if words.len() > 1 {
        let total: usize = words.iter().map(|w| w.chars().count()).sum();
        let matched: usize = words
            .iter()
            .filter(|w| text_lower.contains(**w))
            .map(|w| w.chars().count())
            .sum();

        let share = matched as f32 / total as f32;
        // Containment of the whole term is the exact tier's business
        return (share >= 0.6 && matched < total).then_some(share);
    }

    let term_chars: Vec<char> = term_lower.chars().collect();
    tokens
        .iter()
        .filter_map(|token| {
            let token_lower = token.to_lowercase();
            let prefix = common_prefix_len(&term_chars, &token_lower);
            let share = prefix as f32 / term_chars.len() as f32;
            (share >= 0.75 && prefix < term_chars.len()).then_some(share)
        })
        .fold(None, |best: Option<f32>, share| {
            Some(best.map_or(share, |b| b.max(share)))
        })
}

fn common_prefix_len(term_chars: &[char], token: &str) -> usize {
    term_chars
        .iter()
        .zip(token.chars())
        .take_while(|(a, b)| **a == *b)
        .count()
}

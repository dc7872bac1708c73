//! Localisation file parsing.
//!
//! Paradox-style localisation files are line-oriented:
//!
//! ```text
//! l_english:
//!  some_key:0 "Some value" # trailing comment
//! ```
//!
//! Scripted-localisation files (`customizable_localization/*.txt`) instead
//! carry their translatable text in `add_custom_loc = "Some value"` lines.
//!
//! The extractor reads a file with its game profile's encoding, finds every
//! translatable quoted value, and records enough positional information for
//! the reassembler to splice translations back in without disturbing any
//! other byte of the file.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::errors::ExtractionError;
use crate::game_profile::{language_by_loc_key, GameProfile, LocEncoding};

/// One quoted value scheduled for translation
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatableUnit {
    /// Ordinal of this unit within its file (0-based)
    pub id: usize,
    /// Key name, without the numeric suffix (e.g. "some_key")
    pub key: String,
    /// The text between the quotes, with `\"` unescaped
    pub source_text: String,
    /// Index of the line this unit lives on
    pub line_index: usize,
    /// Byte offset of the first character inside the quotes
    pub value_start: usize,
    /// Byte offset of the closing quote
    pub value_end: usize,
}

/// A parsed localisation file
#[derive(Debug, Clone)]
pub struct LocFile {
    /// Path the file was read from
    pub path: PathBuf,
    /// Every line of the file, without line terminators
    pub lines: Vec<String>,
    /// Units to translate, in file order
    pub units: Vec<TranslatableUnit>,
    /// Line index of the language header, if one was found
    pub header_line: Option<usize>,
    /// Number of values skipped as untranslatable
    pub skipped: usize,
    /// Scripted-loc `.txt` file rather than a Paradox yml
    pub scripted: bool,
    /// The file used CRLF line terminators
    pub crlf: bool,
}

impl LocFile {
    /// Source texts of all units, in order
    pub fn source_texts(&self) -> Vec<String> {
        self.units.iter().map(|u| u.source_text.clone()).collect()
    }
}

/// Decode raw file bytes according to the profile's encoding.
///
/// UTF-8 input (with or without BOM) is always accepted; Windows-1252 is the
/// fallback since every byte sequence decodes under it.
pub fn decode_bytes(bytes: &[u8], encoding: LocEncoding) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            if encoding == LocEncoding::Utf8Bom {
                debug!("File is not valid UTF-8, decoded as Windows-1252");
            }
            decoded.into_owned()
        }
    }
}

/// Parse a localisation file from disk
pub fn extract_file(path: &Path, profile: &GameProfile) -> Result<LocFile> {
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractionError::ReadFailed(format!("{:?}: {}", path, e)))
        .with_context(|| format!("Failed to read localisation file: {:?}", path))?;

    let content = decode_bytes(&bytes, profile.encoding);
    Ok(extract_content(path, &content))
}

/// Parse localisation content that has already been decoded
pub fn extract_content(path: &Path, content: &str) -> LocFile {
    let scripted = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("txt"));
    let crlf = content.contains("\r\n");
    let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();

    let mut units = Vec::new();
    let mut header_line = None;
    let mut skipped = 0usize;

    for (line_index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if scripted {
            let Some((value_start, value_end)) = scripted_span(line) else {
                continue;
            };

            let raw = &line[value_start..value_end];
            let source_text = raw.replace("\\\"", "\"");

            if !is_translatable(SCRIPTED_LOC_KEY, &source_text) {
                skipped += 1;
                continue;
            }

            units.push(TranslatableUnit {
                id: units.len(),
                key: SCRIPTED_LOC_KEY.to_string(),
                source_text,
                line_index,
                value_start,
                value_end,
            });
            continue;
        }

        // Language header: "l_english:" on its own line
        if let Some(stripped) = trimmed.strip_suffix(':') {
            if language_by_loc_key(stripped).is_some() {
                if header_line.is_none() {
                    header_line = Some(line_index);
                }
                continue;
            }
        }

        let Some(colon_pos) = line.find(':') else {
            continue;
        };

        let key_part = &line[..colon_pos];
        let key = key_part.trim().to_string();
        if key.is_empty() {
            continue;
        }

        let value_part = &line[colon_pos + 1..];
        let Some((inner_start, inner_end)) = quoted_span(value_part) else {
            continue;
        };

        // Offsets relative to the whole line
        let value_start = colon_pos + 1 + inner_start;
        let value_end = colon_pos + 1 + inner_end;

        let raw = &line[value_start..value_end];
        let source_text = raw.replace("\\\"", "\"");

        if !is_translatable(&key, &source_text) {
            skipped += 1;
            continue;
        }

        units.push(TranslatableUnit {
            id: units.len(),
            key,
            source_text,
            line_index,
            value_start,
            value_end,
        });
    }

    debug!(
        "Extracted {} unit(s) from {:?} ({} skipped)",
        units.len(),
        path,
        skipped
    );

    LocFile {
        path: path.to_path_buf(),
        lines,
        units,
        header_line,
        skipped,
        scripted,
        crlf,
    }
}

/// Key under which scripted-loc values appear
const SCRIPTED_LOC_KEY: &str = "add_custom_loc";

/// Find the quoted span of an `add_custom_loc = "Text"` line.
///
/// Returns byte offsets relative to the whole line, or `None` for any line
/// that is not an `add_custom_loc` assignment.
fn scripted_span(line: &str) -> Option<(usize, usize)> {
    let eq_pos = line.find('=')?;
    if line[..eq_pos].trim() != SCRIPTED_LOC_KEY {
        return None;
    }

    let (inner_start, inner_end) = quoted_span(&line[eq_pos + 1..])?;
    Some((eq_pos + 1 + inner_start, eq_pos + 1 + inner_end))
}

/// Find the first quoted span in a value part.
///
/// Returns byte offsets (relative to `value_part`) of the first character
/// inside the quotes and of the closing quote. A `#` before the opening
/// quote starts a comment and ends the search; `\"` inside the quotes does
/// not terminate the span.
fn quoted_span(value_part: &str) -> Option<(usize, usize)> {
    let bytes = value_part.as_bytes();
    let mut open = None;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'#' => return None,
            b'"' => {
                open = Some(i);
                break;
            }
            _ => {}
        }
    }

    let open = open?;
    let inner_start = open + 1;

    let mut i = inner_start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some((inner_start, i)),
            _ => i += 1,
        }
    }

    None
}

/// Decide whether a value is worth sending to a model.
///
/// Empty values, pure variable references and keys that just name themselves
/// carry no translatable prose.
fn is_translatable(key: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    // "$SOME_VAR$" with exactly the two delimiting dollars
    let trimmed = value.trim();
    if trimmed.len() > 2
        && trimmed.starts_with('$')
        && trimmed.ends_with('$')
        && trimmed.matches('$').count() == 2
    {
        return false;
    }

    if key == value {
        return false;
    }

    true
}

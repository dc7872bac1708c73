/*!
 * Byte-precise file reassembly.
 *
 * Translations are spliced back into the extracted file's original lines:
 * only the text between a value's quotes and the language header change,
 * every other byte (indentation, comments, blank lines, key names) is
 * carried through untouched. The result is then encoded for the game
 * profile's declared encoding.
 */

use anyhow::{anyhow, Result};
use log::debug;

use crate::extractor::LocFile;
use crate::game_profile::{
    language_by_loc_key, punctuation_map, GameProfile, LanguageSpec, LocEncoding, PL_DIACRITICS,
};

/// Rebuild a localisation file with its translations spliced in.
///
/// `translations` must hold exactly one entry per extracted unit, in unit
/// order. Returns the complete file content for the target language.
pub fn reassemble(
    file: &LocFile,
    translations: &[String],
    source: &LanguageSpec,
    target: &LanguageSpec,
    profile: &GameProfile,
) -> Result<String> {
    if translations.len() != file.units.len() {
        return Err(anyhow!(
            "Translation count mismatch for {:?}: expected {}, got {}",
            file.path,
            file.units.len(),
            translations.len()
        ));
    }

    let mut lines = file.lines.clone();

    for (unit, translated) in file.units.iter().zip(translations) {
        let polished = polish_text(translated, source, profile);
        let escaped = polished.replace('"', "\\\"");

        let line = &lines[unit.line_index];
        let mut patched = String::with_capacity(line.len() + escaped.len());
        patched.push_str(&line[..unit.value_start]);
        patched.push_str(&escaped);
        patched.push_str(&line[unit.value_end..]);
        lines[unit.line_index] = patched;
    }

    // Scripted-loc files carry no language header
    if !file.scripted {
        rewrite_headers(&mut lines, target);
    }

    let eol = if file.crlf { "\r\n" } else { "\n" };
    let mut content = lines.join(eol);
    content.push_str(eol);
    Ok(content)
}

/// Apply punctuation remapping and optional diacritics stripping
fn polish_text(text: &str, source: &LanguageSpec, profile: &GameProfile) -> String {
    let mut result = match punctuation_map(source.code) {
        Some(map) => {
            let mut out = String::with_capacity(text.len());
            for c in text.chars() {
                match map.iter().find(|(from, _)| *from == c) {
                    Some((_, replacement)) => out.push_str(replacement),
                    None => out.push(c),
                }
            }
            out
        }
        None => text.to_string(),
    };

    if profile.strip_diacritics {
        result = result
            .chars()
            .map(|c| {
                PL_DIACRITICS
                    .iter()
                    .find(|(from, _)| *from == c)
                    .map_or(c, |(_, to)| *to)
            })
            .collect();
    }

    result
}

/// Rewrite the language header for the target language.
///
/// The first header line becomes the target key; any further header lines
/// are duplicates and are dropped. A file without a header gets one
/// inserted at the top.
fn rewrite_headers(lines: &mut Vec<String>, target: &LanguageSpec) {
    let target_header = format!("{}:", target.loc_key);
    let mut seen_header = false;

    lines.retain_mut(|line| {
        let trimmed = line.trim();
        let is_header = trimmed
            .strip_suffix(':')
            .is_some_and(|key| language_by_loc_key(key).is_some());

        if !is_header {
            return true;
        }

        if seen_header {
            debug!("Dropping duplicate language header: {}", trimmed);
            return false;
        }

        seen_header = true;
        *line = target_header.clone();
        true
    });

    if !seen_header {
        lines.insert(0, target_header);
    }
}

/// Encode reassembled content with the profile's declared encoding
pub fn encode_output(content: &str, encoding: LocEncoding) -> Vec<u8> {
    match encoding {
        LocEncoding::Utf8Bom => {
            let mut bytes = Vec::with_capacity(content.len() + 3);
            bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
            bytes.extend_from_slice(content.as_bytes());
            bytes
        }
        LocEncoding::Windows1252 => {
            let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(content);
            encoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_content;
    use crate::game_profile::language_by_code;
    use std::path::PathBuf;

    fn langs() -> (&'static LanguageSpec, &'static LanguageSpec) {
        (
            language_by_code("en").unwrap(),
            language_by_code("zh-CN").unwrap(),
        )
    }

    fn extract(content: &str) -> LocFile {
        extract_content(&PathBuf::from("test_l_english.yml"), content)
    }

    #[test]
    fn test_reassemble_shouldSpliceTranslations() {
        let file = extract("l_english:\n key_a:0 \"Hello\" # note\n");
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result = reassemble(&file, &["你好".to_string()], source, target, profile).unwrap();

        assert_eq!(result, "l_simp_chinese:\n key_a:0 \"你好\" # note\n");
    }

    #[test]
    fn test_reassemble_withIdentityTranslations_shouldOnlyChangeHeader() {
        let content = "l_english:\n # comment kept\n key_a:0 \"Hello\"\n\n key_b: \"World\"\n";
        let file = extract(content);
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result =
            reassemble(&file, &file.source_texts(), source, target, profile).unwrap();

        assert_eq!(
            result,
            content.replace("l_english:", "l_simp_chinese:")
        );
    }

    #[test]
    fn test_reassemble_shouldEscapeQuotesInTranslations() {
        let file = extract("l_english:\n key:0 \"plain\"\n");
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result =
            reassemble(&file, &["say \"hi\"".to_string()], source, target, profile).unwrap();

        assert!(result.contains("\"say \\\"hi\\\"\""));
    }

    #[test]
    fn test_reassemble_withDuplicateHeaders_shouldDropExtras() {
        let file = extract("l_english:\n key_a:0 \"One two\"\nl_english:\n key_b:0 \"Two three\"\n");
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result = reassemble(
            &file,
            &["一二".to_string(), "二三".to_string()],
            source,
            target,
            profile,
        )
        .unwrap();

        assert_eq!(result.matches("l_simp_chinese:").count(), 1);
        assert!(!result.contains("l_english:"));
    }

    #[test]
    fn test_reassemble_withoutHeader_shouldInsertOne() {
        let file = extract(" key:0 \"Hello\"\n");
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result = reassemble(&file, &["你好".to_string()], source, target, profile).unwrap();

        assert!(result.starts_with("l_simp_chinese:\n"));
    }

    #[test]
    fn test_reassemble_withCrlfInput_shouldKeepLineEndings() {
        let content = "l_english:\r\n key_a:0 \"Hello\" # note\r\n";
        let file = extract(content);
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result =
            reassemble(&file, &file.source_texts(), source, target, profile).unwrap();

        assert_eq!(result, "l_simp_chinese:\r\n key_a:0 \"Hello\" # note\r\n");
    }

    #[test]
    fn test_reassemble_withScriptedLoc_shouldNotTouchHeaders() {
        let file = extract_content(
            &PathBuf::from("names.txt"),
            "some_loc = {\n\tadd_custom_loc = \"Hello\"\n}\n",
        );
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let result = reassemble(&file, &["你好".to_string()], source, target, profile).unwrap();

        assert_eq!(result, "some_loc = {\n\tadd_custom_loc = \"你好\"\n}\n");
        assert!(!result.contains("l_simp_chinese"));
    }

    #[test]
    fn test_reassemble_withWrongCount_shouldFail() {
        let file = extract("l_english:\n key:0 \"Hello\"\n");
        let (source, target) = langs();
        let profile = GameProfile::for_id("stellaris").unwrap();

        assert!(reassemble(&file, &[], source, target, profile).is_err());
    }

    #[test]
    fn test_polishText_withChineseSource_shouldRemapPunctuation() {
        let source = language_by_code("zh-CN").unwrap();
        let profile = GameProfile::for_id("stellaris").unwrap();

        let polished = polish_text("Hello，world。", source, profile);
        assert_eq!(polished, "Hello,world.");
    }

    #[test]
    fn test_polishText_withLegacyProfile_shouldStripDiacritics() {
        let source = language_by_code("en").unwrap();
        let profile = GameProfile::for_id("eu4").unwrap();

        let polished = polish_text("Zażółć gęślą jaźń", source, profile);
        assert_eq!(polished, "Zazolc gesla jazn");
    }

    #[test]
    fn test_encodeOutput_utf8Bom_shouldPrependBom() {
        let bytes = encode_output("l_english:\n", LocEncoding::Utf8Bom);
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn test_encodeOutput_windows1252_shouldEncodeAccents() {
        let bytes = encode_output("café", LocEncoding::Windows1252);
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
    }
}

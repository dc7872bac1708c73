/*!
 * Provider response parsing and repair.
 *
 * Models are asked for a bare JSON array of strings but routinely wrap it
 * in markdown fences, nest it inside a `{"response": ...}` object, leave a
 * trailing comma or cut the array short. The parser applies a fixed ladder
 * of repairs before giving up, then validates cardinality and rejects
 * responses that merely echo the sources back.
 */

use log::debug;
use serde_json::Value;

use crate::errors::TranslationError;

/// Parse a raw completion into exactly `sources.len()` translations
pub fn parse_translations(
    raw: &str,
    sources: &[String],
) -> Result<Vec<String>, TranslationError> {
    let expected = sources.len();
    let cleaned = strip_fences(raw);
    let cleaned = unwrap_response_envelope(&cleaned);

    let value = parse_with_repairs(&cleaned)?;

    let items = value.as_array().ok_or_else(|| {
        TranslationError::ParseFailure("Response is valid JSON but not an array".to_string())
    })?;

    let mut translations = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => translations.push(s.clone()),
            other => {
                return Err(TranslationError::ParseFailure(format!(
                    "Array item is not a string: {}",
                    other
                )));
            }
        }
    }

    if translations.len() != expected {
        return Err(TranslationError::CardinalityMismatch {
            expected,
            actual: translations.len(),
        });
    }

    if is_echo(&translations, sources) {
        return Err(TranslationError::ParseFailure(
            "Response echoed the source texts unchanged".to_string(),
        ));
    }

    Ok(translations)
}

/// Remove markdown code fences around the payload
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string ("json", "JSON", ...) up to the first newline
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

/// Unwrap a `{"response": "..."}` envelope some CLI tools emit.
///
/// The inner value may be the array itself or a string containing it.
fn unwrap_response_envelope(cleaned: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(cleaned) else {
        return cleaned.to_string();
    };

    let Some(inner) = value.get("response") else {
        return cleaned.to_string();
    };

    match inner {
        Value::String(s) => strip_fences(s),
        other => other.to_string(),
    }
}

/// Try strict parsing, then the repair ladder
fn parse_with_repairs(cleaned: &str) -> Result<Value, TranslationError> {
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }

    // Trim leading/trailing prose around the outermost array
    let sliced = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if end > start => &cleaned[start..=end],
        (Some(start), _) => &cleaned[start..],
        _ => cleaned,
    };

    if let Ok(value) = serde_json::from_str::<Value>(sliced) {
        debug!("Response repaired by slicing to outermost array");
        return Ok(value);
    }

    // Remove a trailing comma before the closing bracket
    let no_trailing_comma = remove_trailing_comma(sliced);
    if let Ok(value) = serde_json::from_str::<Value>(&no_trailing_comma) {
        debug!("Response repaired by removing trailing comma");
        return Ok(value);
    }

    // Close an unterminated final string and/or array
    for suffix in ["]", "\"]"] {
        let candidate = format!("{}{}", no_trailing_comma.trim_end().trim_end_matches(','), suffix);
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            debug!("Response repaired by closing unterminated array");
            return Ok(value);
        }
    }

    Err(TranslationError::ParseFailure(format!(
        "Not valid JSON after repairs: {}",
        truncate(cleaned, 120)
    )))
}

fn remove_trailing_comma(s: &str) -> String {
    let trimmed = s.trim_end();
    if let Some(body) = trimmed.strip_suffix(']') {
        let body = body.trim_end();
        if let Some(body) = body.strip_suffix(',') {
            return format!("{}]", body);
        }
    }
    trimmed.to_string()
}

/// Echo-back guard: a "translation" identical to its input item-for-item is
/// treated as a failed call. Single short tokens are exempt since names and
/// codes can legitimately survive translation unchanged.
fn is_echo(translations: &[String], sources: &[String]) -> bool {
    if translations != sources {
        return false;
    }

    sources.len() > 1 || sources.first().is_some_and(|s| s.chars().count() > 3)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_chars).collect();
        format!("{}...", prefix)
    }
}

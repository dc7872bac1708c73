/*!
 * Fuzzy matching support for glossary terms.
 *
 * Provides Levenshtein distance-based matching so glossary terms are still
 * found when the source text carries minor typos or inflections.
 */

/// Maximum edit distance allowed for a term of the given character length
pub fn max_edit_distance(term_len: usize) -> usize {
    (term_len / 4).max(1)
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use two-row optimization for space efficiency
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)                  // deletion
                .min(curr_row[j - 1] + 1)                    // insertion
                .min(prev_row[j - 1] + cost);                // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Distance of the closest token to `term`, if within the allowed budget.
///
/// Tokens and term are compared lowercased. A zero distance is reported as
/// `None` since an exact token hit belongs to a higher matching tier.
pub fn closest_token_distance(tokens: &[String], term: &str) -> Option<usize> {
    let term_lower = term.to_lowercase();
    let budget = max_edit_distance(term_lower.chars().count());

    tokens
        .iter()
        .filter_map(|token| {
            let d = levenshtein_distance(&token.to_lowercase(), &term_lower);
            (d > 0 && d <= budget).then_some(d)
        })
        .min()
}

use super::types::{AnswerMap, QuestionFilter};

/// Maximum answer value length after normalization.
pub const MAX_ANSWER_CHARS: usize = 40;

/// Punctuation stripped from the end of multi-character values.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', '!', '?'];

/// Normalize a single raw answer value. Applied identically to both
/// extraction paths so the output shape does not depend on the strategy.
///
/// A single alphabetic character is upper-cased. Anything else loses
/// trailing punctuation and is capped at [`MAX_ANSWER_CHARS`]. An empty
/// result means the caller must drop the entry.
pub fn normalize_value(raw: &str) -> String {
    let trimmed = raw.trim();

    let mut chars = trimmed.chars();
    if let (Some(only), None) = (chars.next(), chars.next()) {
        if only.is_alphabetic() {
            return only.to_uppercase().collect();
        }
    }

    let stripped = trimmed.trim_end_matches(TRAILING_PUNCTUATION);
    let truncated: String = stripped.chars().take(MAX_ANSWER_CHARS).collect();
    truncated.trim_end().to_string()
}

/// Normalize every value in a raw map, dropping entries that normalize to
/// empty.
pub fn normalize_map(raw: AnswerMap) -> AnswerMap {
    raw.into_iter()
        .filter_map(|(question, value)| {
            let normalized = normalize_value(&value);
            (!normalized.is_empty()).then_some((question, normalized))
        })
        .collect()
}

/// Keep only entries whose question number is in the filter. An absent or
/// empty filter passes the map through unchanged. Never adds keys.
pub fn apply_filter(answers: AnswerMap, filter: Option<&QuestionFilter>) -> AnswerMap {
    match filter {
        Some(expected) if !expected.is_empty() => answers
            .into_iter()
            .filter(|(question, _)| expected.contains(question))
            .collect(),
        _ => answers,
    }
}

use serde_json::Value;

use super::types::AnswerMap;

/// Parse the model's text output into a raw answer map. Forgiving by
/// design: code fences are stripped, a failed direct parse falls back to
/// the largest `{...}` substring, and anything still unparseable yields an
/// empty map rather than an error — a malformed model response is never
/// fatal.
pub fn parse_model_response(raw: &str) -> AnswerMap {
    let stripped = strip_code_fences(raw);

    let parsed = serde_json::from_str::<Value>(stripped).ok().or_else(|| {
        salvage_object(stripped).and_then(|candidate| serde_json::from_str(candidate).ok())
    });

    match parsed {
        Some(value) => collect_answers(&value),
        None => AnswerMap::new(),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// The substring between the first `{` and the last `}`, when one exists.
fn salvage_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Pull `answers` entries out of the parsed value. Keys must be all
/// decimal digits naming a positive number; values must be non-empty
/// strings after trimming. Everything else is dropped silently.
fn collect_answers(value: &Value) -> AnswerMap {
    let mut map = AnswerMap::new();
    let Some(answers) = value.get("answers").and_then(Value::as_object) else {
        return map;
    };

    for (key, entry) in answers {
        let key = key.trim();
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(question) = key.parse::<u32>() else {
            continue;
        };
        if question == 0 {
            continue;
        }
        let Some(text) = entry.as_str() else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        map.insert(question, text.to_string());
    }

    map
}

use std::sync::LazyLock;

use regex::Regex;

/// Hard cap on cleaned input length. Guards both prompt size on the model
/// path and pattern-matching time on the fallback path. Truncation is
/// silent; trailing partial content is kept as-is.
pub const MAX_INPUT_CHARS: usize = 8000;

// Runs of whitespace that are not line breaks. Newlines must survive so the
// fallback parser can work line by line.
static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\r\n]+").unwrap());

/// Clean raw OCR text ahead of extraction. Pure function: non-breaking
/// spaces become ordinary spaces, runs of non-newline whitespace collapse to
/// one space, the result is trimmed and capped at [`MAX_INPUT_CHARS`].
pub fn clean_ocr_text(raw: &str) -> String {
    let text = raw.replace('\u{00A0}', " ");
    let text = INLINE_WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > MAX_INPUT_CHARS {
        text.chars().take(MAX_INPUT_CHARS).collect()
    } else {
        text.to_string()
    }
}

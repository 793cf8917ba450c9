use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::normalize::MAX_ANSWER_CHARS;
use super::types::{AnswerExtractor, AnswerMap, QuestionFilter, FALLBACK_NOTE};
use super::ExtractError;

/// Highest question number the pattern parser will accept. OCR noise often
/// produces large stray numbers (years, page totals); real sheets stop well
/// below this.
const MAX_QUESTION: u32 = 200;

// One <number><separator?><letter> group. A line carrying two or more of
// these is a compressed run like "1.A2.B3.C" and every group contributes.
static COMPRESSED_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*[.)\-:]?\s*([A-Z])").unwrap());

// "31) Apple", "1. A", "3 - C", "4: TRUE", "1 WORD".
static NUMBER_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,3})[\s.)\-:]+([A-Za-z0-9][A-Za-z0-9 ]*)").unwrap());

// "True 30.", "A 1.", "Apple 2)". The separator after the number is
// required so prose lines that merely mention a number are not matched.
static ANSWER_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9 ]*?)\s+(\d{1,3})\s*[.)\-]").unwrap());

// Roman numeral question marker at the start of a line, separator required.
static ROMAN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([IVXivx]+)\s*[.)\-:]").unwrap());

const ROMAN_NUMERALS: &[&str] = &[
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV",
    "XV", "XVI", "XVII", "XVIII", "XIX", "XX", "XXI", "XXII", "XXIII", "XXIV", "XXV", "XXVI",
    "XXVII", "XXVIII", "XXIX", "XXX",
];

/// One tagged pattern rule. Rules are tried in [`RULE_ORDER`]; the first
/// rule that yields any pairs consumes the line and the rest are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRule {
    /// Two or more adjacent number+letter groups on one line.
    Compressed,
    /// Question number, separator, answer word.
    NumberFirst,
    /// Answer word, whitespace, question number, separator.
    AnswerFirst,
}

/// Fixed precedence. Compressed must come first: its shape is a superset
/// that number-first would misparse as a single overlong match.
pub const RULE_ORDER: &[PatternRule] = &[
    PatternRule::Compressed,
    PatternRule::NumberFirst,
    PatternRule::AnswerFirst,
];

impl PatternRule {
    /// Apply this rule to one line, yielding zero or more (question, value)
    /// pairs.
    pub fn apply(self, line: &str) -> Vec<(u32, String)> {
        match self {
            PatternRule::Compressed => {
                let items = compressed_items(line);
                // A lone group is an ordinary number-first line
                if items.len() >= 2 {
                    items
                } else {
                    Vec::new()
                }
            }
            PatternRule::NumberFirst => NUMBER_FIRST
                .captures(line)
                .and_then(|caps| {
                    let question = caps[1].parse::<u32>().ok()?;
                    Some(vec![(question, clip(caps[2].trim()))])
                })
                .unwrap_or_default(),
            PatternRule::AnswerFirst => ANSWER_FIRST
                .captures(line)
                .and_then(|caps| {
                    let question = caps[2].parse::<u32>().ok()?;
                    Some(vec![(question, clip(caps[1].trim()))])
                })
                .unwrap_or_default(),
        }
    }
}

/// Deterministic pattern parser used when the model path is unavailable or
/// comes back empty. Never fails; worst case is an empty map.
#[derive(Debug, Default)]
pub struct PatternParser;

impl AnswerExtractor for PatternParser {
    fn name(&self) -> &'static str {
        "pattern-fallback"
    }

    fn note(&self) -> Option<&'static str> {
        Some(FALLBACK_NOTE)
    }

    fn extract(
        &self,
        text: &str,
        _expected: Option<&QuestionFilter>,
    ) -> Result<AnswerMap, ExtractError> {
        Ok(parse_patterns(text))
    }
}

/// Run the rule cascade over every non-empty line. No state is carried
/// between lines, so a bare number marker whose answer sits on the next
/// line is not recovered here (the model path handles that layout).
pub fn parse_patterns(text: &str) -> AnswerMap {
    let mut map = AnswerMap::new();

    for raw_line in text.lines() {
        let line = convert_roman_marker(raw_line);
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        for rule in RULE_ORDER {
            let pairs = rule.apply(line);
            if pairs.is_empty() {
                continue;
            }
            for (question, value) in pairs {
                insert(&mut map, question, value);
            }
            break;
        }
    }

    map
}

/// Collect the number+letter groups of a compressed run. A group whose
/// letter is immediately followed by another letter is the start of a word
/// ("31) Apple"), not a compressed item, and is rejected.
fn compressed_items(line: &str) -> Vec<(u32, String)> {
    let mut items = Vec::new();
    for caps in COMPRESSED_GROUP.captures_iter(line) {
        let whole = caps.get(0).unwrap();
        if line[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic())
        {
            continue;
        }
        if let Ok(question) = caps[1].parse::<u32>() {
            items.push((question, caps[2].to_string()));
        }
    }
    items
}

/// Rewrite a leading Roman numeral marker ("II) B", "iv - C") to its decimal
/// form so the regular cascade can handle the line. Lowercase markers are
/// common in OCR output.
fn convert_roman_marker(line: &str) -> Cow<'_, str> {
    let Some(caps) = ROMAN_MARKER.captures(line) else {
        return Cow::Borrowed(line);
    };
    let numeral = caps.get(1).unwrap();
    let Some(digit) = roman_to_digit(&numeral.as_str().to_uppercase()) else {
        return Cow::Borrowed(line);
    };

    let mut rewritten = String::with_capacity(line.len());
    rewritten.push_str(&line[..numeral.start()]);
    rewritten.push_str(&digit.to_string());
    rewritten.push_str(&line[numeral.end()..]);
    Cow::Owned(rewritten)
}

fn roman_to_digit(roman: &str) -> Option<u32> {
    ROMAN_NUMERALS
        .iter()
        .position(|&numeral| numeral == roman)
        .map(|index| index as u32 + 1)
}

fn clip(value: &str) -> String {
    value.chars().take(MAX_ANSWER_CHARS).collect()
}

fn insert(map: &mut AnswerMap, question: u32, value: String) {
    if (1..=MAX_QUESTION).contains(&question) && !value.is_empty() {
        // Last writer wins within a single pass
        map.insert(question, value);
    }
}

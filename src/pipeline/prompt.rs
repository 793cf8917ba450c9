use super::types::QuestionFilter;

/// System prompt for the extraction call. The model must emit nothing but
/// the JSON envelope; response salvage copes with the rest.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You only output valid JSON. No prose.";

/// Build the user prompt for one extraction request. Enumerates every OCR
/// layout the model must recognize and pins the output contract to
/// `{"answers": {...}}`. When the caller supplied expected question numbers
/// they are appended as a hint; enforcement happens later in the filter
/// stage, never here.
pub fn build_extraction_prompt(cleaned_text: &str, expected: Option<&QuestionFilter>) -> String {
    let hint = match expected {
        Some(numbers) if !numbers.is_empty() => {
            let list = numbers
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("\n\nExpected question numbers: {list}")
        }
        _ => String::new(),
    };

    format!(
        r#"You are a strict JSON generator. Extract answers from OCR text that may look like:
1. Apple
2) A
3 - B
4: TRUE
C 5.
II) B

Important formats to handle:
- Headers and instructions: Ignore school name/address lines, NAME/SECTION/DATE/TEACHER fields, and INSTRUCTIONS blocks. Start parsing from the first numbered item.
- Number-first patterns: 1.A, 1)B, 1-C, 1:D, 1 WORD
- Answer-first patterns: "True 30.", "A 1.", "Apple 2)"
- Compressed multi-items: "1.A2.B3.C" or "1.A  3.Z  5.C" (split and map each)
- Cross-line linking: Number on one line ("___ 5."), answer on next ("C")
- Roman numerals: Convert I->1, II->2, III->3, IV->4, V->5, etc.
- Identification words: Single words as answers (e.g., "31) Apple" -> 31:Apple)
- True/False variants: Normalize T->TRUE, F->FALSE, Y->YES, N->NO

Rules:
- Output ONLY JSON with shape: {{"answers":{{"1":"...", "2":"..."}}}}
- Accept single letters (A..Z) and short text (words/numbers), max 40 chars
- Do not invent questions not present; if unsure, omit
- Preserve case for words; uppercase single letters
- Remove trailing punctuation from answers

OCR TEXT:
{cleaned_text}{hint}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_ocr_text() {
        let prompt = build_extraction_prompt("1. A\n2. B", None);
        assert!(prompt.contains("OCR TEXT:\n1. A\n2. B"));
    }

    #[test]
    fn prompt_pins_the_output_contract() {
        let prompt = build_extraction_prompt("1. A", None);
        assert!(prompt.contains(r#"{"answers":{"1":"...", "2":"..."}}"#));
        assert!(prompt.contains("Do not invent questions"));
    }

    #[test]
    fn prompt_lists_layout_variants() {
        let prompt = build_extraction_prompt("1. A", None);
        assert!(prompt.contains("Compressed multi-items"));
        assert!(prompt.contains("Cross-line linking"));
        assert!(prompt.contains("Roman numerals"));
        assert!(prompt.contains("True/False variants"));
    }

    #[test]
    fn expected_numbers_appended_as_hint() {
        let filter = QuestionFilter::from([3, 1, 5]);
        let prompt = build_extraction_prompt("1. A", Some(&filter));
        assert!(prompt.ends_with("Expected question numbers: 1, 3, 5"));
    }

    #[test]
    fn empty_filter_adds_no_hint() {
        let filter = QuestionFilter::new();
        let prompt = build_extraction_prompt("1. A", Some(&filter));
        assert!(!prompt.contains("Expected question numbers"));
    }

    #[test]
    fn system_prompt_forbids_prose() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("valid JSON"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("No prose"));
    }
}

use crate::config::ReparseConfig;

use super::fallback::PatternParser;
use super::llm::ModelExtractor;
use super::normalize::{apply_filter, normalize_map};
use super::openai::OpenAiClient;
use super::preprocess::clean_ocr_text;
use super::types::{AnswerExtractor, ParseResult, QuestionFilter};

/// Composes the full pipeline: preprocess → ordered extraction strategies →
/// normalize → filter. Strategies are tried in order; a failure or an empty
/// raw map falls through to the next one, and there is no retry of an
/// earlier strategy within a request.
pub struct Reparser {
    extractors: Vec<Box<dyn AnswerExtractor + Send + Sync>>,
}

impl Reparser {
    /// Build the standard strategy list from configuration: the model path
    /// when a credential is present, then the pattern fallback.
    pub fn from_config(config: &ReparseConfig) -> Self {
        let mut extractors: Vec<Box<dyn AnswerExtractor + Send + Sync>> = Vec::new();

        match &config.api_key {
            Some(api_key) => {
                let client = OpenAiClient::new(&config.base_url, api_key, config.timeout_secs);
                extractors.push(Box::new(ModelExtractor::new(
                    Box::new(client),
                    &config.model,
                    config.temperature,
                    config.max_tokens,
                )));
            }
            None => {
                tracing::warn!(
                    "no API credential configured; all requests will use the pattern fallback"
                );
            }
        }

        extractors.push(Box::new(PatternParser));
        Self { extractors }
    }

    /// Build from an explicit strategy list. Used by tests.
    pub fn with_extractors(extractors: Vec<Box<dyn AnswerExtractor + Send + Sync>>) -> Self {
        Self { extractors }
    }

    /// Run one request through the pipeline. Never fails: the worst case is
    /// an empty answer map.
    pub fn reparse(&self, raw_text: &str, filter: Option<&QuestionFilter>) -> ParseResult {
        let cleaned = clean_ocr_text(raw_text);

        for (index, extractor) in self.extractors.iter().enumerate() {
            let is_last = index + 1 == self.extractors.len();

            match extractor.extract(&cleaned, filter) {
                Ok(raw_map) if !raw_map.is_empty() || is_last => {
                    let answers = apply_filter(normalize_map(raw_map), filter);
                    tracing::debug!(
                        strategy = extractor.name(),
                        answers = answers.len(),
                        "extraction complete"
                    );
                    return ParseResult {
                        answers,
                        note: extractor.note(),
                    };
                }
                Ok(_) => {
                    tracing::debug!(
                        strategy = extractor.name(),
                        "strategy produced no entries, trying next"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        strategy = extractor.name(),
                        error = %error,
                        "strategy failed, degrading to next"
                    );
                }
            }
        }

        // Unreachable with the standard list: the pattern fallback never fails
        ParseResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::ModelExtractor;
    use crate::pipeline::openai::MockCompletionClient;
    use crate::pipeline::types::{AnswerMap, FALLBACK_NOTE};
    use crate::pipeline::ExtractError;

    fn model_extractor(client: MockCompletionClient) -> Box<ModelExtractor> {
        Box::new(ModelExtractor::new(Box::new(client), "gpt-4o-mini", 0.1, 2000))
    }

    fn with_model_reply(reply: &str) -> Reparser {
        Reparser::with_extractors(vec![
            model_extractor(MockCompletionClient::new(reply)),
            Box::new(PatternParser),
        ])
    }

    fn fallback_only() -> Reparser {
        Reparser::with_extractors(vec![Box::new(PatternParser)])
    }

    fn entry(question: u32, value: &str) -> (u32, String) {
        (question, value.to_string())
    }

    #[test]
    fn model_success_carries_no_note() {
        let reparser = with_model_reply(r#"{"answers":{"1":"a","2":"Banana."}}"#);
        let result = reparser.reparse("1. a\n2) Banana.", None);

        // Values are normalized regardless of the strategy that produced them
        assert_eq!(
            result.answers,
            AnswerMap::from([entry(1, "A"), entry(2, "Banana")])
        );
        assert_eq!(result.note, None);
    }

    #[test]
    fn model_failure_degrades_to_fallback_with_note() {
        let reparser = Reparser::with_extractors(vec![
            model_extractor(MockCompletionClient::failing(|| ExtractError::UpstreamStatus {
                status: 502,
                body: "bad gateway".into(),
            })),
            Box::new(PatternParser),
        ]);

        let result = reparser.reparse("1. A\n2) Banana\n3 - C", None);
        assert_eq!(
            result.answers,
            AnswerMap::from([entry(1, "A"), entry(2, "Banana"), entry(3, "C")])
        );
        assert_eq!(result.note, Some(FALLBACK_NOTE));
    }

    #[test]
    fn empty_model_result_falls_through_to_fallback() {
        // Model replied, but salvage found nothing usable
        let reparser = with_model_reply("no answers in this text, sorry");
        let result = reparser.reparse("1. A", None);

        assert_eq!(result.answers, AnswerMap::from([entry(1, "A")]));
        assert_eq!(result.note, Some(FALLBACK_NOTE));
    }

    #[test]
    fn no_credential_starts_at_fallback() {
        let config = ReparseConfig::default();
        assert!(config.api_key.is_none());
        let reparser = Reparser::from_config(&config);

        let result = reparser.reparse("1. A", None);
        assert_eq!(result.answers, AnswerMap::from([entry(1, "A")]));
        assert_eq!(result.note, Some(FALLBACK_NOTE));
    }

    #[test]
    fn end_to_end_without_filter() {
        let result = fallback_only().reparse("1. A\n2) Banana\n3 - C", None);
        assert_eq!(
            result.answers,
            AnswerMap::from([entry(1, "A"), entry(2, "Banana"), entry(3, "C")])
        );
    }

    #[test]
    fn end_to_end_with_filter() {
        let filter = QuestionFilter::from([1, 3]);
        let result = fallback_only().reparse("1. A\n2) Banana\n3 - C", Some(&filter));
        assert_eq!(result.answers, AnswerMap::from([entry(1, "A"), entry(3, "C")]));
    }

    #[test]
    fn filter_applies_to_model_path_too() {
        let reparser = with_model_reply(r#"{"answers":{"1":"A","2":"B","3":"C"}}"#);
        let filter = QuestionFilter::from([2]);
        let result = reparser.reparse("irrelevant", Some(&filter));
        assert_eq!(result.answers, AnswerMap::from([entry(2, "B")]));
    }

    #[test]
    fn unparseable_input_yields_empty_result_with_note() {
        let result = fallback_only().reparse("completely freeform prose", None);
        assert!(result.answers.is_empty());
        assert_eq!(result.note, Some(FALLBACK_NOTE));
    }

    #[test]
    fn input_is_preprocessed_before_extraction() {
        // NBSP and collapsed whitespace must not confuse the patterns
        let result = fallback_only().reparse("1.\u{00A0}A\n2)\t\tBanana", None);
        assert_eq!(
            result.answers,
            AnswerMap::from([entry(1, "A"), entry(2, "Banana")])
        );
    }

    #[test]
    fn values_normalized_to_empty_are_dropped() {
        let reparser = with_model_reply(r#"{"answers":{"1":"...","2":"B"}}"#);
        let result = reparser.reparse("irrelevant", None);
        assert_eq!(result.answers, AnswerMap::from([entry(2, "B")]));
    }
}

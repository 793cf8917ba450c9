use super::openai::{CompletionClient, CompletionRequest};
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::response::parse_model_response;
use super::types::{AnswerExtractor, AnswerMap, QuestionFilter};
use super::ExtractError;

/// Primary extraction strategy: prompt a completion model with the cleaned
/// OCR text and salvage its JSON reply. Any failure is returned to the
/// orchestrator, which degrades to the pattern fallback — this strategy
/// never raises toward the caller.
pub struct ModelExtractor {
    client: Box<dyn CompletionClient + Send + Sync>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ModelExtractor {
    pub fn new(
        client: Box<dyn CompletionClient + Send + Sync>,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
            max_tokens,
        }
    }
}

impl AnswerExtractor for ModelExtractor {
    fn name(&self) -> &'static str {
        "model"
    }

    fn extract(
        &self,
        text: &str,
        expected: Option<&QuestionFilter>,
    ) -> Result<AnswerMap, ExtractError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            prompt: build_extraction_prompt(text, expected),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let raw = self.client.complete(&request)?;
        Ok(parse_model_response(&raw))
    }
}

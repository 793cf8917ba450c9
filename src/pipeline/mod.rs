pub mod fallback;
pub mod llm;
pub mod normalize;
pub mod openai;
pub mod orchestrator;
pub mod preprocess;
pub mod prompt;
pub mod response;
pub mod types;

use thiserror::Error;

/// Failures of the model-driven extraction path. None of these reach the
/// caller directly: the orchestrator logs them and degrades to the pattern
/// fallback.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No API credential configured for the model path")]
    MissingCredential,

    #[error("Cannot reach completion service at {0}")]
    Connection(String),

    #[error("Completion service returned error (status {status}): {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

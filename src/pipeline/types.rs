use std::collections::{BTreeMap, BTreeSet};

use super::ExtractError;

/// Question number → answer value. Keys are positive integers; values are
/// raw until the normalizer has run. Later writes win on duplicate keys
/// within a single extraction pass.
pub type AnswerMap = BTreeMap<u32, String>;

/// Optional set of question numbers the caller cares about. Empty means
/// no filtering.
pub type QuestionFilter = BTreeSet<u32>;

/// Fixed diagnostic string attached when the deterministic fallback parser
/// produced the answers, so callers can treat the result as lower confidence.
pub const FALLBACK_NOTE: &str = "answers recovered by the offline pattern parser";

/// Final unit returned to the caller: the normalized answer map plus an
/// optional marker naming a degraded extraction path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub answers: AnswerMap,
    pub note: Option<&'static str>,
}

/// One extraction strategy. The orchestrator holds an ordered list of these
/// and tries them until one yields entries.
pub trait AnswerExtractor {
    /// Short strategy name for logging.
    fn name(&self) -> &'static str;

    /// Marker to attach to the response when this strategy produced it.
    fn note(&self) -> Option<&'static str> {
        None
    }

    /// Attempt extraction on cleaned text. `expected` is a contextual hint
    /// only — membership is enforced later by the filter stage.
    fn extract(
        &self,
        text: &str,
        expected: Option<&QuestionFilter>,
    ) -> Result<AnswerMap, ExtractError>;
}

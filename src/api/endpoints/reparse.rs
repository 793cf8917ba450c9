//! Re-parse endpoint: OCR text in, normalized answer map out.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::types::{ParseResult, QuestionFilter};

/// Validated request body for `POST /reparse`.
#[derive(Debug, PartialEq, Eq)]
pub struct ReparseRequest {
    pub text: String,
    pub question_numbers: Option<QuestionFilter>,
}

impl ReparseRequest {
    /// Validate a raw JSON body. Validation is manual rather than derived
    /// so a missing or wrong-typed `text` yields the structured error the
    /// contract promises instead of a generic deserialization rejection.
    pub fn from_value(body: &Value) -> Result<Self, ApiError> {
        let text = body
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ApiError::MissingText)?;

        let question_numbers = match body.get("questionNumbers") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut filter = QuestionFilter::new();
                for item in items {
                    let number = item
                        .as_u64()
                        .filter(|&n| n >= 1 && n <= u64::from(u32::MAX))
                        .ok_or_else(|| {
                            ApiError::BadRequest(
                                "questionNumbers must be an array of positive integers".into(),
                            )
                        })?;
                    filter.insert(number as u32);
                }
                Some(filter)
            }
            Some(_) => {
                return Err(ApiError::BadRequest(
                    "questionNumbers must be an array of positive integers".into(),
                ))
            }
        };

        Ok(Self {
            text: text.to_string(),
            question_numbers,
        })
    }
}

/// Response envelope: string question numbers on the wire, plus the
/// diagnostic note when the fallback path produced the answers.
#[derive(Debug, Serialize)]
pub struct ReparseResponse {
    pub answers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl From<ParseResult> for ReparseResponse {
    fn from(result: ParseResult) -> Self {
        Self {
            answers: result
                .answers
                .into_iter()
                .map(|(question, value)| (question.to_string(), value))
                .collect(),
            note: result.note,
        }
    }
}

/// `POST /reparse` — run the extraction pipeline on raw OCR text.
///
/// The pipeline's model path makes one blocking network round trip, so the
/// work runs on the blocking pool rather than a runtime worker.
pub async fn reparse(
    State(ctx): State<ApiContext>,
    Json(body): Json<Value>,
) -> Result<Json<ReparseResponse>, ApiError> {
    let request = ReparseRequest::from_value(&body)?;

    let reparser = ctx.reparser.clone();
    let result = tokio::task::spawn_blocking(move || {
        reparser.reparse(&request.text, request.question_numbers.as_ref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("reparse task failed: {e}")))?;

    Ok(Json(ReparseResponse::from(result)))
}

//! Pulls the naming JSON out of free-form model output.

use thiserror::Error;

use crate::models::AiAnalysis;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model reply contains no JSON object")]
    NoJson,
    #[error("model reply is not valid naming JSON: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Parses `text` as an [`AiAnalysis`].
///
/// Tries the whole text first, then the span from the first `{` to the last `}`.
pub fn extract_analysis(text: &str) -> Result<AiAnalysis, ExtractError> {
    if let Ok(analysis) = serde_json::from_str::<AiAnalysis>(text) {
        return Ok(analysis);
    }

    let span = json_object_span(text).ok_or(ExtractError::NoJson)?;
    Ok(serde_json::from_str(span)?)
}

/// Substring from the first `{` to the last `}`, if both exist in that order
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

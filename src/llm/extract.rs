//! Pull the structured analysis out of free-form model text.
//!
//! Models wrap JSON in prose ("Sure! {...} Hope that helps"). The candidate
//! object spans from the first `{` to the last `}`; anything outside it is
//! ignored. The span must parse as a JSON object whose three fields are
//! non-blank strings.

use serde_json::Value;

use super::types::{
    FIELD_IRONIC_FULFILLMENT, FIELD_LOGIC_ANALYSIS, FIELD_VISUAL_PROMPT, LlmError, StructuredAnalysis,
};

/// Outermost `{ ... }` span of `text`, if there is one.
#[must_use]
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse and validate the analysis embedded in `text`.
///
/// # Errors
///
/// - [`LlmError::InvalidJson`] when no object span exists or it does not parse
/// - [`LlmError::IncompleteAnalysis`] when a required field is absent, blank,
///   or not a string
pub fn parse_analysis(text: &str) -> Result<StructuredAnalysis, LlmError> {
    let span = json_object_span(text).ok_or_else(|| LlmError::InvalidJson("no JSON object found".into()))?;
    let value: Value = serde_json::from_str(span).map_err(|e| LlmError::InvalidJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(LlmError::InvalidJson("expected a JSON object".into()));
    };

    let field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_owned)
    };
    let logic_analysis = field(FIELD_LOGIC_ANALYSIS);
    let ironic_fulfillment = field(FIELD_IRONIC_FULFILLMENT);
    let visual_prompt = field(FIELD_VISUAL_PROMPT);

    match (logic_analysis, ironic_fulfillment, visual_prompt) {
        (Some(logic_analysis), Some(ironic_fulfillment), Some(visual_prompt)) => {
            Ok(StructuredAnalysis { logic_analysis, ironic_fulfillment, visual_prompt })
        }
        (a, b, c) => {
            let missing = [(FIELD_LOGIC_ANALYSIS, a), (FIELD_IRONIC_FULFILLMENT, b), (FIELD_VISUAL_PROMPT, c)]
                .into_iter()
                .filter_map(|(name, v)| v.is_none().then_some(name))
                .collect();
            Err(LlmError::IncompleteAnalysis { missing })
        }
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

//! LLM types — the structured analysis contract and errors.

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while turning a wish into a structured analysis.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Every candidate model failed to produce a successful response.
    #[error("all {provider} models failed: {last}")]
    AllModelsExhausted { provider: &'static str, last: String },

    /// The successful response body was not a chat-completions document.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The first choice carried no message text.
    #[error("model returned empty content")]
    EmptyModelOutput,

    /// No JSON object could be extracted from the model text.
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),

    /// The JSON object lacks one or more required fields.
    #[error("model output missing required fields: {}", missing.join(", "))]
    IncompleteAnalysis { missing: Vec<&'static str> },
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AllModelsExhausted { .. } => "E_ALL_MODELS_EXHAUSTED",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyModelOutput => "E_EMPTY_MODEL_OUTPUT",
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::IncompleteAnalysis { .. } => "E_INCOMPLETE_ANALYSIS",
        }
    }

    /// Only upstream exhaustion is transient; a bad reply stays bad.
    fn retryable(&self) -> bool {
        matches!(self, Self::AllModelsExhausted { .. })
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

pub const FIELD_LOGIC_ANALYSIS: &str = "logic_analysis";
pub const FIELD_IRONIC_FULFILLMENT: &str = "ironic_fulfillment";
pub const FIELD_VISUAL_PROMPT: &str = "visual_prompt";

/// The three-field object a model reply must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAnalysis {
    pub logic_analysis: String,
    pub ironic_fulfillment: String,
    /// English image-generation prompt describing the ironic outcome.
    pub visual_prompt: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

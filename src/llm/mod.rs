//! LLM — wish analysis through a chat-completions provider.
//!
//! DESIGN
//! ======
//! The registry picks one provider; this module walks that provider's model
//! list in order. Each model gets the retrying client; the first model that
//! answers with a 2xx wins and the rest are never tried. The winning reply
//! is then parsed, and a parse failure is final (it does not fall back to
//! the next model).

pub mod chat;
pub mod extract;
pub mod prompt;
pub mod types;

use tracing::{info, warn};

pub use types::{LlmError, StructuredAnalysis};

use crate::providers::LlmProviderConfig;
use crate::upstream::fallback::first_success;
use crate::upstream::retry::{RetryPolicy, call_with_retry};
use crate::upstream::{Transport, UpstreamResponse};

/// Turn `wish` into a validated [`StructuredAnalysis`].
///
/// # Errors
///
/// - [`LlmError::AllModelsExhausted`] when no model returns a 2xx response
/// - [`LlmError::EmptyModelOutput`], [`LlmError::InvalidJson`],
///   [`LlmError::IncompleteAnalysis`] when the winning reply is unusable
pub async fn analyze(
    transport: &dyn Transport,
    policy: RetryPolicy,
    wish: &str,
    config: &LlmProviderConfig,
) -> Result<StructuredAnalysis, LlmError> {
    let user = prompt::user_message(wish);
    let user = user.as_str();

    let response = first_success(config.models.as_slice(), |model| async move {
        info!(provider = config.name(), %model, "llm: trying model");
        let request = chat::build_request(config, &model, prompt::SYSTEM_PROMPT, user);
        let response = call_with_retry(transport, &request, policy)
            .await
            .map_err(|e| e.to_string())?;
        if response.is_success() {
            info!(provider = config.name(), %model, "llm: model succeeded");
            Ok::<UpstreamResponse, String>(response)
        } else {
            Err(response.diagnostic())
        }
    })
    .await
    .map_err(|exhausted| {
        let last = exhausted
            .last
            .unwrap_or_else(|| "no candidate models configured".to_string());
        warn!(provider = config.name(), attempted = exhausted.attempted, %last, "llm: all models failed");
        LlmError::AllModelsExhausted { provider: config.name(), last }
    })?;

    let text = chat::parse_chat_completions_response(&response.body)?.ok_or(LlmError::EmptyModelOutput)?;
    extract::parse_analysis(&text)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

//! Chat-completions wire format shared by every LLM provider.
//!
//! Builds `{ model, messages, temperature, max_tokens }` requests and reads
//! the first choice's message text back out.

use serde_json::{Value, json};

use super::types::LlmError;
use crate::providers::LlmProviderConfig;
use crate::upstream::OutboundRequest;

pub const TEMPERATURE: f64 = 0.8;
pub const MAX_TOKENS: u32 = 1500;

/// Build the request for one candidate `model`.
///
/// Attribution headers are attached only when the provider carries them.
#[must_use]
pub fn build_request(config: &LlmProviderConfig, model: &str, system: &str, user: &str) -> OutboundRequest {
    let body = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    });
    let mut request = OutboundRequest::post_json(&config.endpoint, &config.api_key, body);
    if let Some(attribution) = &config.attribution {
        request = request
            .with_header("HTTP-Referer", &attribution.referer)
            .with_header("X-Title", &attribution.title);
    }
    request
}

/// Extract `choices[0].message.content` from a chat-completions body.
///
/// Returns `Ok(None)` when the document is well formed but carries no text.
/// Content given as an array of text parts is concatenated.
pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<Option<String>, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Ok(None);
    };
    let Some(content) = choice.get("message").and_then(|m| m.get("content")) else {
        return Ok(None);
    };

    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect(),
        _ => String::new(),
    };
    Ok(if text.trim().is_empty() { None } else { Some(text) })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

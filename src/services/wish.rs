//! Wish service — rate limit → providers → validation → LLM → image.
//!
//! DESIGN
//! ======
//! Receives the request body for one client, runs every stage in order,
//! and stops at the first failure. The LLM and image calls are strictly
//! sequential because the image prompt comes from the analysis. Every stage
//! failure is a [`WishError`]; the route maps it to a status and a sanitized
//! message. A body the route could not read arrives as `Err` and is rejected
//! at the validation stage, after the rate-limit gate.
//!
//! The upstream stages run under the configured pipeline deadline, so the
//! worst case is bounded even when every candidate retries to exhaustion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::image::{self, ImageError};
use crate::llm::{self, LlmError};
use crate::providers::{ProviderError, ResolvedProviders, resolve_providers};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WishError {
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    MissingConfiguration(#[from] ProviderError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("pipeline deadline of {secs}s exceeded")]
    DeadlineExceeded { secs: u64 },
}

impl ErrorCode for WishError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RateLimited(e) => e.error_code(),
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::MissingConfiguration(e) => e.error_code(),
            Self::Llm(e) => e.error_code(),
            Self::Image(e) => e.error_code(),
            Self::DeadlineExceeded { .. } => "E_DEADLINE_EXCEEDED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::RateLimited(e) => e.retryable(),
            Self::InvalidInput(_) | Self::MissingConfiguration(_) => false,
            Self::Llm(e) => e.retryable(),
            Self::Image(e) => e.retryable(),
            Self::DeadlineExceeded { .. } => true,
        }
    }
}

/// Inbound JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct WishRequest {
    #[serde(default)]
    pub wish: Value,
}

/// Terminal success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishResult {
    pub logic_analysis: String,
    pub ironic_fulfillment: String,
    pub image_url: String,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Run the whole pipeline for one request from `client`.
///
/// `body` is the raw request body, or the reason it could not be read.
///
/// # Errors
///
/// Returns the first stage failure as a [`WishError`].
pub async fn handle_wish(
    state: &AppState,
    client: &str,
    body: Result<&[u8], String>,
) -> Result<WishResult, WishError> {
    let span = info_span!("wish", request_id = %Uuid::new_v4(), %client);
    let result = run(state, client, body).instrument(span.clone()).await;
    if let Err(e) = &result {
        let _enter = span.enter();
        match e {
            WishError::RateLimited(_) | WishError::InvalidInput(_) => {
                warn!(code = e.error_code(), error = %e, "wish: rejected");
            }
            _ => error!(code = e.error_code(), retryable = e.retryable(), error = %e, "wish: failed"),
        }
    }
    result
}

async fn run(state: &AppState, client: &str, body: Result<&[u8], String>) -> Result<WishResult, WishError> {
    state.rate_limiter.check_and_record(client)?;

    let credentials = state.credentials.credentials();
    let providers = resolve_providers(state.config.mode, &credentials)?;

    let wish = body
        .map_err(|e| WishError::InvalidInput(format!("unreadable request body: {e}")))
        .and_then(parse_wish)?;
    info!(wish_len = wish.chars().count(), llm = providers.llm.name(), images = providers.images.len(), "wish: accepted");

    let upstream = fulfill(state, &wish, &providers);
    match state.config.pipeline_deadline {
        Some(deadline) => tokio::time::timeout(deadline, upstream)
            .await
            .map_err(|_| WishError::DeadlineExceeded { secs: deadline.as_secs() })?,
        None => upstream.await,
    }
}

async fn fulfill(state: &AppState, wish: &str, providers: &ResolvedProviders) -> Result<WishResult, WishError> {
    let policy = state.retry_policy();
    let transport = state.transport.as_ref();

    let analysis = llm::analyze(transport, policy, wish, &providers.llm).await?;
    let image_url = image::generate_image(transport, policy, &analysis.visual_prompt, &providers.images).await?;

    info!("wish: fulfilled");
    Ok(WishResult {
        logic_analysis: analysis.logic_analysis,
        ironic_fulfillment: analysis.ironic_fulfillment,
        image_url,
    })
}

/// Parse the request body and return the trimmed, non-empty wish.
///
/// # Errors
///
/// Returns [`WishError::InvalidInput`] for malformed JSON, a non-string
/// `wish`, or a wish that is empty after trimming.
pub fn parse_wish(body: &[u8]) -> Result<String, WishError> {
    let request: WishRequest =
        serde_json::from_slice(body).map_err(|e| WishError::InvalidInput(format!("malformed JSON body: {e}")))?;
    let wish = match request.wish {
        Value::String(wish) => wish,
        Value::Null => String::new(),
        _ => return Err(WishError::InvalidInput("wish must be a string".into())),
    };
    let wish = wish.trim();
    if wish.is_empty() {
        return Err(WishError::InvalidInput("wish is empty".into()));
    }
    Ok(wish.to_string())
}

#[cfg(test)]
#[path = "wish_test.rs"]
mod tests;

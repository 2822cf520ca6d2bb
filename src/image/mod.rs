//! Image — render the visual prompt with the first provider that yields a URL.
//!
//! DESIGN
//! ======
//! Providers are tried in registry order. A provider fails when its retries
//! are exhausted, when it answers with a non-2xx status (the body is kept as
//! diagnostic detail), or when a 2xx body has no URL where that provider
//! puts it. The first non-empty URL wins.

pub mod schema;

use tracing::info;

use crate::providers::ImageProviderConfig;
use crate::upstream::fallback::first_success;
use crate::upstream::retry::{RetryPolicy, call_with_retry};
use crate::upstream::Transport;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("all image providers failed: {last}")]
    AllImageProvidersExhausted { last: String },
}

impl crate::error::ErrorCode for ImageError {
    fn error_code(&self) -> &'static str {
        "E_ALL_IMAGE_PROVIDERS_EXHAUSTED"
    }
}

/// Generate an image for `visual_prompt` and return its provider-hosted URL.
///
/// # Errors
///
/// Returns [`ImageError::AllImageProvidersExhausted`] with the last
/// provider's diagnostic when no provider yields a URL.
pub async fn generate_image(
    transport: &dyn Transport,
    policy: RetryPolicy,
    visual_prompt: &str,
    providers: &[ImageProviderConfig],
) -> Result<String, ImageError> {
    let prompt = schema::decorate_prompt(visual_prompt);
    let prompt = prompt.as_str();

    first_success(providers, |provider| async move {
        info!(provider = %provider, "image: trying provider");
        let request = schema::build_request(&provider, prompt);
        let response = call_with_retry(transport, &request, policy)
            .await
            .map_err(|e| format!("{provider}: {e}"))?;
        if !response.is_success() {
            return Err(format!("{provider}: {}", response.diagnostic()));
        }
        let url = response
            .json()
            .and_then(|root| schema::extract_url(provider.kind, &root))
            .ok_or_else(|| format!("{provider}: no image URL in response: {}", response.diagnostic()))?;
        info!(provider = %provider, "image: provider succeeded");
        Ok(url)
    })
    .await
    .map_err(|exhausted| ImageError::AllImageProvidersExhausted {
        last: exhausted
            .last
            .unwrap_or_else(|| "no image providers configured".to_string()),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

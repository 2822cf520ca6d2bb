//! Per-provider request and response shapes for image generation.
//!
//! Every provider receives the same decorated prompt; only field names and
//! defaults differ. The URL also lives in a different place per provider.

use serde_json::{Value, json};

use crate::providers::{ImageProviderConfig, ImageProviderKind};
use crate::upstream::OutboundRequest;

pub const IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
pub const IMAGE_SIZE: u32 = 1024;
pub const IMAGE_STEPS: u32 = 4;
pub const STYLE_SUFFIX: &str = "dark surreal art, dramatic lighting, high contrast, cinematic composition";

/// Append the house style to the model's visual prompt.
#[must_use]
pub fn decorate_prompt(visual_prompt: &str) -> String {
    format!("{}, {STYLE_SUFFIX}", visual_prompt.trim())
}

/// Translate `prompt` into `provider`'s request schema.
#[must_use]
pub fn build_request(provider: &ImageProviderConfig, prompt: &str) -> OutboundRequest {
    let body = match provider.kind {
        ImageProviderKind::Together => json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "width": IMAGE_SIZE,
            "height": IMAGE_SIZE,
            "steps": IMAGE_STEPS,
            "n": 1,
        }),
        ImageProviderKind::SiliconFlow => json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "image_size": format!("{IMAGE_SIZE}x{IMAGE_SIZE}"),
            "batch_size": 1,
            "num_inference_steps": IMAGE_STEPS,
            "prompt_enhancement": false,
        }),
    };
    OutboundRequest::post_json(&provider.endpoint, &provider.api_key, body)
}

/// Locate the generated image URL in `provider`'s response document.
#[must_use]
pub fn extract_url(kind: ImageProviderKind, root: &Value) -> Option<String> {
    let first_url = |list: &str| {
        root.get(list)
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| item.get("url"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    };
    match kind {
        ImageProviderKind::Together => first_url("data"),
        ImageProviderKind::SiliconFlow => first_url("images").or_else(|| first_url("data")),
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;

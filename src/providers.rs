//! Provider registry — which LLM and image providers serve this request.
//!
//! DESIGN
//! ======
//! Resolution is a pure function of the credentials present and the mode.
//! Credentials are re-read for every request (see [`CredentialSource`]), so a
//! rotated key takes effect on the next call without a restart.
//!
//! - LLM: the first provider with a credential wins, and only its model list
//!   is tried downstream. Production order is OpenRouter, DeepSeek,
//!   SiliconFlow; non-production reverses it.
//! - Images: every provider with a credential is kept as a fallback
//!   candidate. Production prefers Together, non-production SiliconFlow.
//!   Each SiliconFlow region key is its own candidate, global first.

use std::fmt;

use crate::config::Mode;

pub const DEFAULT_SITE_URL: &str = "https://bestwish.vercel.app";
pub const ATTRIBUTION_TITLE: &str = "Evil Wish Machine";

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_SILICONFLOW_BASE_URL: &str = "https://api.siliconflow.com/v1";
pub const DEFAULT_SILICONFLOW_CN_BASE_URL: &str = "https://api.siliconflow.cn/v1";
pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const IMAGE_GENERATIONS_PATH: &str = "/images/generations";

const OPENROUTER_MODELS: &[&str] = &["anthropic/claude-3.5-sonnet", "deepseek/deepseek-chat"];
const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat"];
const SILICONFLOW_MODELS: &[&str] = &["deepseek-ai/DeepSeek-V3", "Qwen/Qwen2.5-72B-Instruct"];

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(
        "missing configuration: no LLM provider credential (set OPENROUTER_API_KEY, DEEPSEEK_API_KEY, SILICONFLOW_API_KEY or SILICONFLOW_CN_API_KEY)"
    )]
    NoLlmProvider,
    #[error(
        "missing configuration: no image provider credential (set TOGETHER_API_KEY, SILICONFLOW_API_KEY or SILICONFLOW_CN_API_KEY)"
    )]
    NoImageProvider,
}

impl crate::error::ErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        "E_MISSING_CONFIGURATION"
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Snapshot of every credential and endpoint override the registry reads.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openrouter: Option<String>,
    pub deepseek: Option<String>,
    pub siliconflow: Option<String>,
    pub siliconflow_cn: Option<String>,
    pub together: Option<String>,
    pub site_url: Option<String>,
    pub base_urls: BaseUrls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    pub openrouter: String,
    pub deepseek: String,
    pub siliconflow: String,
    pub siliconflow_cn: String,
    pub together: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            openrouter: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            deepseek: DEFAULT_DEEPSEEK_BASE_URL.to_string(),
            siliconflow: DEFAULT_SILICONFLOW_BASE_URL.to_string(),
            siliconflow_cn: DEFAULT_SILICONFLOW_CN_BASE_URL.to_string(),
            together: DEFAULT_TOGETHER_BASE_URL.to_string(),
        }
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`. Blank values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let base = |key: &str, default: &str| {
            var(key).map_or_else(|| default.to_string(), |v| v.trim_end_matches('/').to_string())
        };

        Self {
            openrouter: var("OPENROUTER_API_KEY"),
            deepseek: var("DEEPSEEK_API_KEY"),
            siliconflow: var("SILICONFLOW_API_KEY"),
            siliconflow_cn: var("SILICONFLOW_CN_API_KEY"),
            together: var("TOGETHER_API_KEY"),
            site_url: var("SITE_URL"),
            base_urls: BaseUrls {
                openrouter: base("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
                deepseek: base("DEEPSEEK_BASE_URL", DEFAULT_DEEPSEEK_BASE_URL),
                siliconflow: base("SILICONFLOW_BASE_URL", DEFAULT_SILICONFLOW_BASE_URL),
                siliconflow_cn: base("SILICONFLOW_CN_BASE_URL", DEFAULT_SILICONFLOW_CN_BASE_URL),
                together: base("TOGETHER_BASE_URL", DEFAULT_TOGETHER_BASE_URL),
            },
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |v: &Option<String>| v.is_some();
        f.debug_struct("Credentials")
            .field("openrouter", &present(&self.openrouter))
            .field("deepseek", &present(&self.deepseek))
            .field("siliconflow", &present(&self.siliconflow))
            .field("siliconflow_cn", &present(&self.siliconflow_cn))
            .field("together", &present(&self.together))
            .field("site_url", &self.site_url)
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

/// Where the pipeline gets credentials from on each request.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Credentials;
}

/// Reads the process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Credentials {
        Credentials::from_env()
    }
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Credentials {
        self.clone()
    }
}

// =============================================================================
// PROVIDER CONFIGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    OpenRouter,
    DeepSeek,
    SiliconFlow,
}

impl LlmProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::DeepSeek => "deepseek",
            Self::SiliconFlow => "siliconflow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProviderKind {
    Together,
    SiliconFlow,
}

impl ImageProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Together => "together",
            Self::SiliconFlow => "siliconflow",
        }
    }
}

/// Attribution headers some providers require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub referer: String,
    pub title: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct LlmProviderConfig {
    pub kind: LlmProviderKind,
    pub api_key: String,
    pub endpoint: String,
    pub models: Vec<String>,
    pub attribution: Option<Attribution>,
}

impl LlmProviderConfig {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl fmt::Debug for LlmProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmProviderConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("models", &self.models)
            .field("attribution", &self.attribution)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageProviderConfig {
    pub kind: ImageProviderKind,
    /// Distinguishes region variants of one provider in logs, e.g. `siliconflow-cn`.
    pub label: String,
    pub api_key: String,
    pub endpoint: String,
}

impl fmt::Debug for ImageProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageProviderConfig")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ImageProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProviders {
    pub llm: LlmProviderConfig,
    pub images: Vec<ImageProviderConfig>,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve the LLM provider and ordered image providers for `mode`.
///
/// # Errors
///
/// Returns [`ProviderError`] when no LLM credential or no image credential
/// is available.
pub fn resolve_providers(mode: Mode, creds: &Credentials) -> Result<ResolvedProviders, ProviderError> {
    let llm = resolve_llm(mode, creds).ok_or(ProviderError::NoLlmProvider)?;
    let images = resolve_images(mode, creds);
    if images.is_empty() {
        return Err(ProviderError::NoImageProvider);
    }
    Ok(ResolvedProviders { llm, images })
}

fn llm_priority(mode: Mode) -> [LlmProviderKind; 3] {
    use LlmProviderKind::{DeepSeek, OpenRouter, SiliconFlow};
    match mode {
        Mode::Production => [OpenRouter, DeepSeek, SiliconFlow],
        Mode::Development => [SiliconFlow, DeepSeek, OpenRouter],
    }
}

fn image_priority(mode: Mode) -> [ImageProviderKind; 2] {
    use ImageProviderKind::{SiliconFlow, Together};
    match mode {
        Mode::Production => [Together, SiliconFlow],
        Mode::Development => [SiliconFlow, Together],
    }
}

fn resolve_llm(mode: Mode, creds: &Credentials) -> Option<LlmProviderConfig> {
    llm_priority(mode)
        .into_iter()
        .find_map(|kind| llm_config(kind, creds))
}

fn llm_config(kind: LlmProviderKind, creds: &Credentials) -> Option<LlmProviderConfig> {
    let urls = &creds.base_urls;
    let (api_key, base, models, attribution) = match kind {
        LlmProviderKind::OpenRouter => {
            let attribution = Attribution {
                referer: creds
                    .site_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
                title: ATTRIBUTION_TITLE.to_string(),
            };
            (creds.openrouter.as_ref()?, &urls.openrouter, OPENROUTER_MODELS, Some(attribution))
        }
        LlmProviderKind::DeepSeek => (creds.deepseek.as_ref()?, &urls.deepseek, DEEPSEEK_MODELS, None),
        LlmProviderKind::SiliconFlow => {
            // Global region wins when both keys exist.
            let (_, key, base) = siliconflow_regions(creds).into_iter().next()?;
            (key, base, SILICONFLOW_MODELS, None)
        }
    };
    Some(LlmProviderConfig {
        kind,
        api_key: api_key.clone(),
        endpoint: format!("{base}{CHAT_COMPLETIONS_PATH}"),
        models: models.iter().map(|m| (*m).to_string()).collect(),
        attribution,
    })
}

fn resolve_images(mode: Mode, creds: &Credentials) -> Vec<ImageProviderConfig> {
    let mut out = Vec::new();
    for kind in image_priority(mode) {
        match kind {
            ImageProviderKind::Together => {
                if let Some(key) = &creds.together {
                    out.push(image_config(kind, "together", key, &creds.base_urls.together));
                }
            }
            ImageProviderKind::SiliconFlow => {
                for (label, key, base) in siliconflow_regions(creds) {
                    out.push(image_config(kind, label, key, base));
                }
            }
        }
    }
    out
}

fn image_config(kind: ImageProviderKind, label: &str, key: &str, base: &str) -> ImageProviderConfig {
    ImageProviderConfig {
        kind,
        label: label.to_string(),
        api_key: key.to_string(),
        endpoint: format!("{base}{IMAGE_GENERATIONS_PATH}"),
    }
}

/// SiliconFlow `(label, key, base_url)` per configured region, global first.
fn siliconflow_regions(creds: &Credentials) -> Vec<(&'static str, &String, &String)> {
    let urls = &creds.base_urls;
    [
        ("siliconflow", &creds.siliconflow, &urls.siliconflow),
        ("siliconflow-cn", &creds.siliconflow_cn, &urls.siliconflow_cn),
    ]
    .into_iter()
    .filter_map(|(label, key, base)| key.as_ref().map(|k| (label, k, base)))
    .collect()
}

#[cfg(test)]
#[path = "providers_test.rs"]
mod tests;

use super::*;
use std::collections::HashMap;

fn creds(pairs: &[(&str, &str)]) -> Credentials {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    Credentials::from_lookup(|key| map.get(key).map(|v| (*v).to_string()))
}

fn all_keys() -> Credentials {
    creds(&[
        ("OPENROUTER_API_KEY", "or-key"),
        ("DEEPSEEK_API_KEY", "ds-key"),
        ("SILICONFLOW_API_KEY", "sf-key"),
        ("SILICONFLOW_CN_API_KEY", "sf-cn-key"),
        ("TOGETHER_API_KEY", "tg-key"),
    ])
}

fn labels(images: &[ImageProviderConfig]) -> Vec<&str> {
    images.iter().map(|p| p.label.as_str()).collect()
}

// =============================================================================
// LLM selection
// =============================================================================

#[test]
fn production_prefers_openrouter_with_model_fallback_list() {
    let resolved = resolve_providers(Mode::Production, &all_keys()).unwrap();
    assert_eq!(resolved.llm.kind, LlmProviderKind::OpenRouter);
    assert_eq!(resolved.llm.api_key, "or-key");
    assert_eq!(resolved.llm.endpoint, "https://openrouter.ai/api/v1/chat/completions");
    assert_eq!(resolved.llm.models, vec!["anthropic/claude-3.5-sonnet", "deepseek/deepseek-chat"]);
}

#[test]
fn development_reverses_llm_priority() {
    let resolved = resolve_providers(Mode::Development, &all_keys()).unwrap();
    assert_eq!(resolved.llm.kind, LlmProviderKind::SiliconFlow);
    assert_eq!(resolved.llm.api_key, "sf-key", "global region wins over mainland");
    assert_eq!(resolved.llm.endpoint, "https://api.siliconflow.com/v1/chat/completions");
    assert!(resolved.llm.attribution.is_none());
}

#[test]
fn production_falls_through_to_next_present_credential() {
    let c = creds(&[("DEEPSEEK_API_KEY", "ds-key"), ("TOGETHER_API_KEY", "tg")]);
    let resolved = resolve_providers(Mode::Production, &c).unwrap();
    assert_eq!(resolved.llm.kind, LlmProviderKind::DeepSeek);
    assert_eq!(resolved.llm.endpoint, "https://api.deepseek.com/chat/completions");
    assert_eq!(resolved.llm.models, vec!["deepseek-chat"]);
}

#[test]
fn mainland_key_alone_serves_siliconflow() {
    let c = creds(&[("SILICONFLOW_CN_API_KEY", "cn"), ("TOGETHER_API_KEY", "tg")]);
    let resolved = resolve_providers(Mode::Development, &c).unwrap();
    assert_eq!(resolved.llm.api_key, "cn");
    assert_eq!(resolved.llm.endpoint, "https://api.siliconflow.cn/v1/chat/completions");
}

#[test]
fn openrouter_carries_attribution_with_site_url() {
    let c = creds(&[
        ("OPENROUTER_API_KEY", "or"),
        ("TOGETHER_API_KEY", "tg"),
        ("SITE_URL", "https://wishes.example"),
    ]);
    let resolved = resolve_providers(Mode::Production, &c).unwrap();
    assert_eq!(
        resolved.llm.attribution,
        Some(Attribution { referer: "https://wishes.example".into(), title: ATTRIBUTION_TITLE.into() })
    );
}

#[test]
fn openrouter_attribution_defaults_site_url() {
    let c = creds(&[("OPENROUTER_API_KEY", "or"), ("TOGETHER_API_KEY", "tg")]);
    let resolved = resolve_providers(Mode::Production, &c).unwrap();
    assert_eq!(resolved.llm.attribution.unwrap().referer, DEFAULT_SITE_URL);
}

// =============================================================================
// Image selection
// =============================================================================

#[test]
fn production_image_order_keeps_all_candidates() {
    let resolved = resolve_providers(Mode::Production, &all_keys()).unwrap();
    assert_eq!(labels(&resolved.images), vec!["together", "siliconflow", "siliconflow-cn"]);
    assert_eq!(resolved.images[0].endpoint, "https://api.together.xyz/v1/images/generations");
    assert_eq!(resolved.images[2].endpoint, "https://api.siliconflow.cn/v1/images/generations");
}

#[test]
fn development_image_order_prefers_siliconflow() {
    let resolved = resolve_providers(Mode::Development, &all_keys()).unwrap();
    assert_eq!(labels(&resolved.images), vec!["siliconflow", "siliconflow-cn", "together"]);
}

// =============================================================================
// Missing configuration
// =============================================================================

#[test]
fn no_llm_credential_is_missing_configuration() {
    let c = creds(&[("TOGETHER_API_KEY", "tg")]);
    assert!(matches!(resolve_providers(Mode::Production, &c), Err(ProviderError::NoLlmProvider)));
}

#[test]
fn no_image_credential_is_missing_configuration() {
    let c = creds(&[("OPENROUTER_API_KEY", "or"), ("DEEPSEEK_API_KEY", "ds")]);
    assert!(matches!(resolve_providers(Mode::Production, &c), Err(ProviderError::NoImageProvider)));
}

#[test]
fn blank_credentials_count_as_absent() {
    let c = creds(&[("OPENROUTER_API_KEY", "   "), ("TOGETHER_API_KEY", "")]);
    assert!(c.openrouter.is_none());
    assert!(matches!(resolve_providers(Mode::Production, &c), Err(ProviderError::NoLlmProvider)));
}

// =============================================================================
// Credentials
// =============================================================================

#[test]
fn base_url_overrides_trim_trailing_slash() {
    let c = creds(&[
        ("OPENROUTER_API_KEY", "or"),
        ("TOGETHER_API_KEY", "tg"),
        ("OPENROUTER_BASE_URL", "http://localhost:9000/v1/"),
    ]);
    let resolved = resolve_providers(Mode::Production, &c).unwrap();
    assert_eq!(resolved.llm.endpoint, "http://localhost:9000/v1/chat/completions");
}

#[test]
fn debug_output_never_contains_keys() {
    let c = all_keys();
    let resolved = resolve_providers(Mode::Production, &c).unwrap();
    let rendered = format!("{c:?} {resolved:?}");
    for secret in ["or-key", "ds-key", "sf-key", "sf-cn-key", "tg-key"] {
        assert!(!rendered.contains(secret), "debug output leaked {secret}");
    }
}

#[test]
fn static_credentials_source_returns_snapshot() {
    let c = all_keys();
    assert_eq!(c.credentials().together.as_deref(), Some("tg-key"));
}

use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults_when_empty() {
    let cfg = AppConfig::from_lookup(lookup_from(&[]));
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.mode, Mode::Development);
    assert_eq!(cfg.rate_limit.window, Duration::from_millis(60_000));
    assert_eq!(cfg.upstream.max_attempts, 3);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("APP_ENV", "production"),
        ("PORT", "8080"),
        ("BIND_ADDR", "127.0.0.1"),
        ("RATE_LIMIT_WINDOW_MS", "1000"),
        ("RATE_LIMIT_MAX_PRODUCTION", "5"),
        ("UPSTREAM_MAX_ATTEMPTS", "4"),
        ("UPSTREAM_BASE_DELAY_MS", "250"),
        ("PIPELINE_DEADLINE_SECS", "30"),
    ]));
    assert_eq!(cfg.mode, Mode::Production);
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.bind_addr, "127.0.0.1");
    assert_eq!(cfg.rate_limit.window, Duration::from_secs(1));
    assert_eq!(cfg.rate_limit.max_for(Mode::Production), 5);
    assert_eq!(cfg.rate_limit.max_for(Mode::Development), DEFAULT_RATE_LIMIT_MAX_DEVELOPMENT);
    assert_eq!(cfg.upstream.max_attempts, 4);
    assert_eq!(cfg.upstream.base_delay, Duration::from_millis(250));
    assert_eq!(cfg.pipeline_deadline, Some(Duration::from_secs(30)));
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("PORT", "not-a-port"), ("UPSTREAM_MAX_ATTEMPTS", "-1")]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.upstream.max_attempts, DEFAULT_UPSTREAM_MAX_ATTEMPTS);
}

#[test]
fn zero_attempts_is_clamped_to_one() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("UPSTREAM_MAX_ATTEMPTS", "0")]));
    assert_eq!(cfg.upstream.max_attempts, 1);
}

#[test]
fn zero_deadline_disables_it() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("PIPELINE_DEADLINE_SECS", "0")]));
    assert!(cfg.pipeline_deadline.is_none());
}

#[test]
fn mode_parse_accepts_prod_aliases() {
    assert_eq!(Mode::parse(Some("production")), Mode::Production);
    assert_eq!(Mode::parse(Some(" PROD ")), Mode::Production);
    assert_eq!(Mode::parse(Some("staging")), Mode::Development);
    assert_eq!(Mode::parse(None), Mode::Development);
}

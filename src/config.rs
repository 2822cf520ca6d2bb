//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every setting has a default, so the service boots with no environment at
//! all (and then fails each wish with a configuration error until credentials
//! appear). Parsing goes through a lookup function so tests can feed a map
//! instead of mutating the process environment.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_RATE_LIMIT_MAX_PRODUCTION: usize = 2;
pub const DEFAULT_RATE_LIMIT_MAX_DEVELOPMENT: usize = 10;
pub const DEFAULT_RATE_LIMIT_SWEEP_SECS: u64 = 60;

pub const DEFAULT_UPSTREAM_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_UPSTREAM_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PIPELINE_DEADLINE_SECS: u64 = 180;

// =============================================================================
// MODE
// =============================================================================

/// Deployment context. Changes provider priority and rate-limit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    /// Parse `APP_ENV`. Only `production`/`prod` (any case) select production.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

// =============================================================================
// TYPED CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_production: usize,
    pub max_development: usize,
    pub sweep_interval: Duration,
}

impl RateLimitConfig {
    /// Admits allowed per window for the given mode.
    #[must_use]
    pub fn max_for(&self, mode: Mode) -> usize {
        match mode {
            Mode::Production => self.max_production,
            Mode::Development => self.max_development,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
            max_production: DEFAULT_RATE_LIMIT_MAX_PRODUCTION,
            max_development: DEFAULT_RATE_LIMIT_MAX_DEVELOPMENT,
            sweep_interval: Duration::from_secs(DEFAULT_RATE_LIMIT_SWEEP_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_UPSTREAM_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_UPSTREAM_BASE_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: Mode,
    pub bind_addr: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
    pub upstream: UpstreamConfig,
    /// `None` disables the end-to-end deadline.
    pub pipeline_deadline: Option<Duration>,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `APP_ENV`: `production` selects production mode
    /// - `BIND_ADDR`, `PORT`
    /// - `RATE_LIMIT_WINDOW_MS`, `RATE_LIMIT_MAX_PRODUCTION`,
    ///   `RATE_LIMIT_MAX_DEVELOPMENT`, `RATE_LIMIT_SWEEP_SECS`
    /// - `UPSTREAM_MAX_ATTEMPTS`, `UPSTREAM_BASE_DELAY_MS`,
    ///   `UPSTREAM_REQUEST_TIMEOUT_SECS`, `UPSTREAM_CONNECT_TIMEOUT_SECS`
    /// - `PIPELINE_DEADLINE_SECS`: `0` disables the deadline
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mode = Mode::parse(lookup("APP_ENV").as_deref());
        let bind_addr = lookup("BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let rate_limit = RateLimitConfig {
            window: Duration::from_millis(parse_or(&lookup, "RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS)),
            max_production: parse_or(&lookup, "RATE_LIMIT_MAX_PRODUCTION", DEFAULT_RATE_LIMIT_MAX_PRODUCTION),
            max_development: parse_or(&lookup, "RATE_LIMIT_MAX_DEVELOPMENT", DEFAULT_RATE_LIMIT_MAX_DEVELOPMENT),
            sweep_interval: Duration::from_secs(
                parse_or(&lookup, "RATE_LIMIT_SWEEP_SECS", DEFAULT_RATE_LIMIT_SWEEP_SECS).max(1),
            ),
        };

        let upstream = UpstreamConfig {
            max_attempts: parse_or(&lookup, "UPSTREAM_MAX_ATTEMPTS", DEFAULT_UPSTREAM_MAX_ATTEMPTS).max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "UPSTREAM_BASE_DELAY_MS", DEFAULT_UPSTREAM_BASE_DELAY_MS)),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_REQUEST_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
            )),
        };

        let deadline_secs = parse_or(&lookup, "PIPELINE_DEADLINE_SECS", DEFAULT_PIPELINE_DEADLINE_SECS);
        let pipeline_deadline = (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs));

        Self {
            mode,
            bind_addr,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            rate_limit,
            upstream,
            pipeline_deadline,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Development,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            rate_limit: RateLimitConfig::default(),
            upstream: UpstreamConfig::default(),
            pipeline_deadline: Some(Duration::from_secs(DEFAULT_PIPELINE_DEADLINE_SECS)),
        }
    }
}

/// Parse `key` via `lookup`, falling back to `default` when unset or malformed.
pub(crate) fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

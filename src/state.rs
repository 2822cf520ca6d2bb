//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! owns the rate limiter (the only mutable shared state), the outbound
//! transport, and the credential source read on every request. Nothing here
//! is a global, so tests build isolated states.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::providers::CredentialSource;
use crate::rate_limit::RateLimiter;
use crate::upstream::Transport;
use crate::upstream::retry::RetryPolicy;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rate_limiter: RateLimiter,
    pub transport: Arc<dyn Transport>,
    pub credentials: Arc<dyn CredentialSource>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        let rate_limiter = RateLimiter::for_mode(&config.rate_limit, config.mode);
        Self { config: Arc::new(config), rate_limiter, transport, credentials }
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.config.upstream)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

//! In-memory rate limiting for wish requests.
//!
//! DESIGN
//! ======
//! Sliding-window timestamps backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by client identity (usually an IP address). One limit is enforced:
//! at most N admits per identity per window, where N depends on the mode.
//!
//! Expired timestamps are filtered on every read. A rejected request leaves
//! the stored sequence untouched; an admitted one stores the filtered
//! sequence plus `now`, which is where pruning happens. Identities that go
//! idle are dropped by `sweep`, run periodically from `main`, so the map
//! does not grow with every address ever seen.
//!
//! State is process-local: restarts and horizontal scaling reset counters.
//! This is advisory throttling, not a security control.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::{Mode, RateLimitConfig};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded (max {limit} requests/{window_ms}ms)")]
    Exceeded { limit: usize, window_ms: u128 },
}

impl crate::error::ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        "E_RATE_LIMITED"
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    limit: usize,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window: Duration, limit: usize) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), window, limit }
    }

    /// Build a limiter with the threshold for `mode`.
    #[must_use]
    pub fn for_mode(config: &RateLimitConfig, mode: Mode) -> Self {
        Self::new(config.window, config.max_for(mode))
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request from `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] when the identity already has
    /// `limit` requests inside the window; nothing is recorded in that case.
    pub fn check_and_record(&self, identity: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(identity, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, identity: &str, now: Instant) -> Result<(), RateLimitError> {
        // One lock covers read, check and write so racing requests from the
        // same identity never see a half-updated sequence.
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let live = inner
            .get(identity)
            .map_or(0, |seen| seen.iter().filter(|&&ts| within(ts, now, self.window)).count());
        if live >= self.limit {
            return Err(RateLimitError::Exceeded { limit: self.limit, window_ms: self.window.as_millis() });
        }

        let seen = inner.entry(identity.to_owned()).or_default();
        seen.retain(|&ts| within(ts, now, self.window));
        seen.push_back(now);
        Ok(())
    }

    /// Drop identities with no timestamps left inside the window.
    /// Returns the number of identities removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = inner.len();
        inner.retain(|_, seen| seen.iter().any(|&ts| within(ts, now, self.window)));
        before - inner.len()
    }

    /// Number of identities currently tracked.
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

/// Spawn the periodic idle-identity sweep.
pub fn spawn_sweep_task(limiter: RateLimiter, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(removed, remaining = limiter.tracked_identities(), "rate limit: swept idle identities");
            }
        }
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn within(ts: Instant, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(ts) < window
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;

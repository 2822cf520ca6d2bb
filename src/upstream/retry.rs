//! Retrying client: bounded attempts with exponential backoff.
//!
//! Attempt k failing with a retryable outcome waits `base_delay * 2^(k-1)`
//! before attempt k+1. No jitter. Only 429, 5xx and transport failures are
//! retried; every other status goes straight back to the caller.

use std::time::Duration;

use tracing::warn;

use super::{OutboundRequest, Transport, TransportError, UpstreamError, UpstreamResponse};
use crate::config::UpstreamConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl From<&UpstreamConfig> for RetryPolicy {
    fn from(config: &UpstreamConfig) -> Self {
        Self { max_attempts: config.max_attempts, base_delay: config.base_delay }
    }
}

/// How the retry loop treats one attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx: hand back to the caller.
    Success,
    /// Transport failure, 429 or 5xx: try again if attempts remain.
    Retryable,
    /// Any other status: hand back to the caller untouched.
    Permanent,
}

#[must_use]
pub fn classify(outcome: &Result<UpstreamResponse, TransportError>) -> Outcome {
    match outcome {
        Err(_) => Outcome::Retryable,
        Ok(response) => match response.status {
            429 | 500.. => Outcome::Retryable,
            200..=299 => Outcome::Success,
            _ => Outcome::Permanent,
        },
    }
}

/// Send `request`, retrying retryable outcomes up to `policy.max_attempts`.
///
/// # Errors
///
/// Returns [`UpstreamError::ExhaustedRetries`] carrying the last failure when
/// every attempt was retryable.
pub async fn call_with_retry(
    transport: &dyn Transport,
    request: &OutboundRequest,
    policy: RetryPolicy,
) -> Result<UpstreamResponse, UpstreamError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        let outcome = transport.send(request).await;
        match classify(&outcome) {
            Outcome::Success | Outcome::Permanent => {
                if let Ok(response) = outcome {
                    return Ok(response);
                }
            }
            Outcome::Retryable => {}
        }

        last = match &outcome {
            Ok(response) => response.diagnostic(),
            Err(e) => e.to_string(),
        };

        if attempt < max_attempts {
            let delay = policy.delay_after(attempt);
            warn!(
                url = %request.url,
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = %last,
                "upstream: retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(UpstreamError::ExhaustedRetries { attempts: max_attempts, last })
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

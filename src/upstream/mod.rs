//! Upstream — outbound HTTP plumbing shared by the LLM and image stages.
//!
//! DESIGN
//! ======
//! Every provider call goes through the [`Transport`] trait so tests can
//! script responses. [`retry::call_with_retry`] wraps one call with bounded
//! exponential backoff, and [`fallback::first_success`] walks an ordered list
//! of candidates (models or image providers) until one succeeds.

pub mod fallback;
pub mod retry;

use std::time::Duration;

use serde_json::Value;

use crate::config::UpstreamConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Transport-level failure: nothing usable came back from the provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors produced by the retrying client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// Every attempt failed with a retryable outcome.
    #[error("gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for UpstreamError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ExhaustedRetries { .. } => "E_EXHAUSTED_RETRIES",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. })
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A single JSON POST to a provider.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub bearer: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl OutboundRequest {
    #[must_use]
    pub fn post_json(url: impl Into<String>, bearer: impl Into<String>, body: Value) -> Self {
        Self { url: url.into(), bearer: bearer.into(), headers: Vec::new(), body }
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Status and raw body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, `None` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Body as diagnostic detail: parsed JSON when possible, raw text otherwise.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self.json() {
            Some(value) => format!("HTTP {}: {value}", self.status),
            None => format!("HTTP {}: {}", self.status, self.body.trim()),
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Provider-neutral async transport. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Any received response, whatever its status, is `Ok`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Self::with_timeouts(config.request_timeout, config.connect_timeout)
    }

    pub fn with_timeouts(request: Duration, connect: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(request)
            .connect_timeout(connect)
            .build()
            .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .http
            .post(&request.url)
            .bearer_auth(&request.bearer)
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

//! Wish route — `POST /api/wish`.
//!
//! Resolves the caller's identity from proxy headers, hands the raw body to
//! the wish service, and maps [`WishError`] onto the three response classes.
//! Malformed or oversized bodies are rejected by the service (after rate
//! limiting), not by an axum extractor, so they still count against the
//! caller's quota.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::wish::{WishError, handle_wish};
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const FALLBACK_IDENTITY: &str = "127.0.0.1";

pub async fn submit_wish(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identity(&parts.headers, peer);

    let read = axum::body::to_bytes(body, MAX_BODY_BYTES).await;
    let body = read
        .as_deref()
        .map_err(|e| format!("request body exceeds {MAX_BODY_BYTES} bytes or failed to read: {e}"));

    match handle_wish(&state, &client, body).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => wish_error_to_response(&e),
    }
}

/// Identity used for rate limiting, most specific source first.
///
/// A blank first `x-forwarded-for` entry (`", 10.0.0.1"`) is treated as no
/// forwarded address at all and falls through to `x-real-ip`, rather than
/// keying every such client under the empty string.
pub(crate) fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    if let Some(ip) = header("x-real-ip").or_else(|| header("cf-connecting-ip")) {
        return ip.to_string();
    }
    peer.map_or_else(|| FALLBACK_IDENTITY.to_string(), |addr| addr.ip().to_string())
}

pub(crate) fn wish_error_to_response(err: &WishError) -> Response {
    match err {
        WishError::RateLimited(_) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "The wish machine is out of energy, please try again later" })),
        )
            .into_response(),
        WishError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": "Please enter your wish" }))).into_response()
        }
        WishError::MissingConfiguration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Service misconfigured: required API keys are missing",
                "details": err.to_string(),
            })),
        )
            .into_response(),
        WishError::Llm(_) | WishError::Image(_) | WishError::DeadlineExceeded { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "The wish machine is malfunctioning, please try again later",
                "details": err.to_string(),
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[path = "wish_test.rs"]
mod tests;

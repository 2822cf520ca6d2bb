//! Grepable error codes shared by every error type in the crate.

/// Grepable error code and retryable flag for structured error logging.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

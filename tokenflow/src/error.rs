//! # Error Taxonomy
//!
//! One error enum for the whole library. The variants mirror the failure
//! classes the pipeline distinguishes:
//!
//! - **`NetworkUnavailable`**: connection refused, timeout, truncated body.
//!   Retried by the submission, confirmation and fetch layers.
//! - **`Provider`**: the gateway answered, but with an error status.
//!   Also retried, since providers reject transiently under load.
//! - **`RetryLimitExceeded`**: a retry policy ran out of attempts. Terminal
//!   for that unit of work only.
//! - **`TransactionFailed`** / **`NotFound`**: confirmed on-chain failure and
//!   "never resolved" (not visible, or still pending at the poll ceiling).
//!
//! Everything else (I/O, JSON, config, signing) is local and never retried.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("provider rejected request ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("{operation} gave up after {attempts} attempts: {last_error}")]
    RetryLimitExceeded {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("transaction {hash} failed with status '{status}'")]
    TransactionFailed { hash: String, status: String },

    #[error("transaction {hash} not found after {attempts} attempts")]
    NotFound { hash: String, attempts: u32 },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("cache error at {path}: {message}")]
    Cache { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether a retry policy may try the failed operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::NetworkUnavailable(_) | Error::Provider { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Error::Provider {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            Error::NetworkUnavailable(e.to_string())
        }
    }
}

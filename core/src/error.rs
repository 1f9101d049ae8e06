//! Error types for the Transkit client.
//!
//! # Design
//! One variant per failure kind a caller can act on. Precondition failures
//! (`InvalidParameters`, `NoAuthData`) are raised before any network
//! activity. Transport and decode failures wrap the underlying error
//! unchanged so callers can inspect it.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TranskitError>;

/// Errors returned by `Transkit` operations.
#[derive(Debug, Error)]
pub enum TranskitError {
    /// A required caller-supplied argument was empty.
    #[error("invalid parameters")]
    InvalidParameters,

    /// The client has no API key but the operation requires one.
    #[error("no auth string provided")]
    NoAuthData,

    /// The request payload could not be serialized to JSON.
    #[error("error creating request bytes: {0}")]
    Marshal(#[source] serde_json::Error),

    /// The server returned 401.
    #[error("invalid API key or expired")]
    InvalidApiKey,

    /// The server returned a status other than 200 or 401. The body is
    /// discarded.
    #[error("invalid status code: {0}")]
    InvalidStatusCode(u16),

    /// DNS, connection, TLS or I/O failure in the HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// A 200 response body did not match the expected shape.
    #[error("response decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

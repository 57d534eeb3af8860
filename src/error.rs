//! Error types for ollama-bridge

use thiserror::Error;

/// Result type alias using [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for ollama-bridge
///
/// Backend failures are wrapped, not translated: connectivity problems,
/// non-success statuses and malformed payloads surface to the caller as the
/// underlying transport or decode error.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// HTTP request error (connectivity, timeout, non-success status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading a streaming response body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

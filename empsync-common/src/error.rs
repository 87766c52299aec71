//! Common error types for empsync

use thiserror::Error;

/// Common result type for empsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the reconciliation engine
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error (status and message from the remote service)
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    /// Network-level failure before a status code was received
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

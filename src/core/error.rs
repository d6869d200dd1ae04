//! Error types for replay operations.

use thiserror::Error;

/// Errors that stop a replay before any request is dispatched.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Configuration rejected during pre-flight validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The shared HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
    /// The result sink failed while writing its header.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors raised by result sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// CSV encoding or write failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Underlying writer failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by an HTTP transport for a single request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the per-request timeout.
    #[error("request timed out")]
    Timeout,
    /// The redirect limit was exceeded.
    #[error("too many redirects")]
    TooManyRedirects,
    /// The connection could not be established.
    #[error("connect error: {0}")]
    Connect(String),
    /// Anything else (bad URL, protocol error, ...).
    #[error("{0}")]
    Other(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

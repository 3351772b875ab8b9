//! Error types for the unsubscribe engine.
//!
//! Expected conditions — rejected URLs, unreachable hosts, missing send
//! capability, exhausted cascades — never escape as errors; they become
//! part of the `ExecutionResult` returned to the caller. The enums here
//! classify failures inside the strategies before that conversion.

use std::time::Duration;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Failures of a single HTTP unsubscribe attempt.
///
/// `Timeout` and `Network` are kept distinct for observability; the
/// cascade treats both as a failed attempt and moves on.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("URL rejected: {0}")]
    Rejected(String),
}

/// Failures of the mailto strategy and its send capability.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("send capability not available")]
    CapabilityUnavailable,

    #[error("invalid mailto URI: {0}")]
    InvalidMailto(String),

    #[error("mailto URI has no recipient")]
    MissingRecipient,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

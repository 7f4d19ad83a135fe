//! Error types for the masking proxy.
//!
//! Each subsystem gets its own error enum; `ProxyError` aggregates them so
//! call sites can propagate with `?` regardless of which layer failed. HTTP
//! status mapping lives in proxy-api, not here — this crate has no axum
//! dependency.

use thiserror::Error;

/// Errors from extracting text spans out of a provider request body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("request did not match any known provider shape: {reason}")]
    UnknownShape { reason: String },

    #[error("malformed {field}: {reason}")]
    MalformedField { field: String, reason: String },
}

/// Errors from the PII detector client (the external analyzer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("analyzer at {url} unreachable or returned non-2xx: {reason}")]
    Unavailable { url: String, reason: String },

    #[error("analyzer response was undecodable or schema-invalid: {reason}")]
    Malformed { reason: String },
}

/// Errors from conflict resolution and span masking.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MaskError {
    #[error("invalid entity span [{start},{end}) over text of length {len}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Errors from the upstream provider call and the stream transformer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("upstream provider call failed with status {status}: {message}")]
    UpstreamFailure { status: u16, message: String },

    #[error("stream aborted: {reason}")]
    Aborted { reason: String },
}

/// Errors from loading or validating `ProxyConfig`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Aggregate error type for the masking engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("detector error: {0}")]
    Detect(#[from] DetectError),

    #[error("masking error: {0}")]
    Mask(#[from] MaskError),

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for masking engine operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

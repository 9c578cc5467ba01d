//! Error types for sealed payloads.

use thiserror::Error;

/// Errors that can occur while building or opening a sealed payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The recomputed digest does not match the received digest.
    ///
    /// Deliberately carries no detail: nothing about the payload may be
    /// trusted once verification has failed.
    #[error("integrity check failed")]
    Integrity,

    /// The payload is shorter than the digest prefix
    #[error("payload too short for a digest prefix: {len} bytes")]
    Truncated { len: usize },

    /// The key material is below the minimum length
    #[error("secret key too short: {len} bytes (need at least 32)")]
    KeyTooShort { len: usize },

    /// The key material was rejected by the MAC implementation
    #[error("invalid key material")]
    InvalidKey,

    /// The verified body is not valid UTF-8
    #[error("verified body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The verified body failed to parse as a document
    #[error("verified body failed to parse: {0}")]
    Body(#[from] text::error::Error),
}

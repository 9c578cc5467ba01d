//! Error types for tag resolution and representation.

use thiserror::Error;

/// Errors that can occur while resolving or representing tagged values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The document carries a tag with no registered constructor
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// A value's type has no registered representer
    #[error("no representer registered for {0}")]
    NoRepresenter(&'static str),

    /// A resolved value is not of the requested type
    #[error("resolved value is not a {expected}")]
    TypeMismatch { expected: &'static str },

    /// A constructor did not find a required mapping field
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A constructor received a node of the wrong shape
    #[error("unexpected node shape: expected {0}")]
    UnexpectedShape(&'static str),

    /// A tag name is malformed
    #[error("invalid tag: {0}")]
    Tag(#[from] node::error::Error),

    /// The document text failed to parse
    #[error("parse: {0}")]
    Parse(#[from] text::error::Error),
}

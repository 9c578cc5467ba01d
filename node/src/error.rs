//! Error types for the document tree model.

use thiserror::Error;

/// Errors that can occur when constructing tree model values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A tag was constructed from an empty name
    #[error("empty tag name")]
    EmptyTagName,

    /// A tag name contains a character outside `[A-Za-z0-9._-]`
    #[error("invalid character in tag name: {0:?}")]
    InvalidTagCharacter(char),

    /// A tag literal does not start with `!`
    #[error("missing '!' tag sigil")]
    MissingTagSigil,
}

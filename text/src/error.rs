//! Error types for parsing textual tree documents.

use thiserror::Error;

/// Errors that can occur while parsing a document.
///
/// Line numbers are 1-based and refer to the original input, including
/// blank and comment-only lines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The input at the given line is not valid document syntax
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Indentation uses a tab character
    #[error("tab character in indentation at line {0}")]
    TabIndent(usize),

    /// A quoted scalar is missing its closing quote
    #[error("unterminated quoted scalar at line {0}")]
    UnterminatedQuote(usize),

    /// Content remains after the end of the document
    #[error("trailing content at line {0}")]
    TrailingInput(usize),

    /// A tag literal is malformed
    #[error("invalid tag: {0}")]
    Tag(#[from] node::error::Error),
}

impl Error {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }
}

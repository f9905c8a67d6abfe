//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input. `position` is a byte offset into the parsed text.
    #[error("parse error at byte {position}: {message}")]
    Parse { message: String, position: usize },

    /// Unusable encoding label handed to `parse_with_encoding`.
    #[error("unsupported encoding: {0}")]
    Encoding(String),

    /// An edit that would corrupt the tree; the document is unchanged.
    #[error("invalid edit: {0}")]
    StructuralEdit(String),

    /// Content that cannot be represented in well-formed XML.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn edit(message: impl Into<String>) -> Self {
        Error::StructuralEdit(message.into())
    }

    /// Byte offset for parse errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }
}

//! Error types for field property processing

use crate::deck::KeywordLocation;
use thiserror::Error;

/// Errors raised by the property engine and its facades
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldPropsError {
    /// Size mismatch, out-of-range box, limit violation or unsupported keyword
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Legacy facade asked about a keyword its tables do not know
    #[error("logic error: {0}")]
    Logic(String),

    /// Name is structurally absent from the queried collection
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Deck content is inconsistent; carries where the keyword came from
    #[error("{location}: {message}")]
    Input {
        message: String,
        location: KeywordLocation,
    },
}

impl FieldPropsError {
    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a `Logic` error.
    pub fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    /// Create a `Lookup` error.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create an `Input` error at the given deck location.
    pub fn input(msg: impl Into<String>, location: &KeywordLocation) -> Self {
        Self::Input {
            message: msg.into(),
            location: location.clone(),
        }
    }

    /// Re-raise any error as an `Input` error attributed to `location`.
    ///
    /// Errors that already carry a location are passed through untouched so
    /// the innermost keyword stays the reported culprit.
    #[must_use]
    pub fn at(self, location: &KeywordLocation) -> Self {
        match self {
            Self::Input { .. } => self,
            Self::InvalidArgument(msg) | Self::Logic(msg) | Self::Lookup(msg) => {
                Self::input(msg, location)
            }
        }
    }
}

/// Result type for property engine operations.
pub type Result<T> = std::result::Result<T, FieldPropsError>;

//! Errors raised while reading capability documents.

use thiserror::Error;

/// A capability document was fetched but is not usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityParseError {
    #[error("XML parsing error at position {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("Document is empty or has no root element")]
    Empty,

    #[error("Unexpected root element '{found}', expected {expected}")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("Missing mandatory section: {0}")]
    MissingSection(&'static str),
}

/// Result type for capability parsing.
pub type Result<T> = std::result::Result<T, CapabilityParseError>;

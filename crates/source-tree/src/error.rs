//! Error types for source loading and lifecycle operations.

use std::time::Duration;

use ogc_capabilities::CapabilityParseError;
use thiserror::Error;
use webdata_common::SourceType;

use crate::host::ActivationError;

/// Why a request to a capability or detail endpoint failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// A server could not be reached or did not deliver a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to fetch {url}: {kind}")]
pub struct SourceFetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl SourceFetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Timeout(_))
    }
}

/// Errors surfaced by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WebdataError {
    #[error(transparent)]
    Fetch(#[from] SourceFetchError),

    #[error("Invalid capabilities from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: CapabilityParseError,
    },

    #[error("A layer or source named '{0}' already exists")]
    DuplicateName(String),

    /// Only ever logged; a load never fails with it.
    #[error("Could not resolve the WFS namespace of {url}: {reason}")]
    NamespaceResolution { url: String, reason: String },

    #[error("'{0}' has children and cannot be added to the map itself")]
    NotALeaf(String),

    #[error("'{0}' is not on the map")]
    NotAdded(String),

    #[error("Failed to activate '{name}': {source}")]
    Activation {
        name: String,
        #[source]
        source: ActivationError,
    },

    #[error("No node '{name}' in source {url}")]
    NodeNotFound { url: String, name: String },

    #[error("Source type '{0}' is not supported by this operation")]
    UnsupportedSource(SourceType),
}

impl WebdataError {
    /// Fetch and parse failures: the source itself is unusable.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, WebdataError::Fetch(_) | WebdataError::Parse { .. })
    }
}

/// Result type for engine operations.
pub type WebdataResult<T> = Result<T, WebdataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_and_parse_are_distinguishable() {
        let fetch: WebdataError = SourceFetchError::new(
            "https://example.com/wms",
            FetchErrorKind::Timeout(Duration::from_secs(30)),
        )
        .into();
        let parse = WebdataError::Parse {
            url: "https://example.com/wms".into(),
            source: CapabilityParseError::MissingSection("Capability"),
        };

        assert!(matches!(&fetch, WebdataError::Fetch(e) if e.is_timeout()));
        assert!(matches!(parse, WebdataError::Parse { .. }));
        assert!(fetch.is_load_failure() && parse.is_load_failure());
        assert!(!WebdataError::DuplicateName("a".into()).is_load_failure());
    }

    #[test]
    fn test_messages_carry_url() {
        let err = SourceFetchError::new("https://example.com/wfs", FetchErrorKind::Status(503));
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/wfs: server responded with HTTP 503"
        );
    }
}

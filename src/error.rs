//! Error types for OSM API operations.

use std::io;
use thiserror::Error;

use crate::types::ElementKind;

/// Result type for OSM API operations.
pub type Result<T> = std::result::Result<T, OsmError>;

/// Errors that can occur during OSM API operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OsmError {
    /// Non-2xx response or connection failure. Connection-level failures
    /// carry status 0 and an empty status text.
    #[error("HTTP {status} {status_text}: {message}")]
    Http {
        message: String,
        status: u16,
        status_text: String,
    },

    /// Malformed XML fed to the converter. Kept separate from [`OsmError::Http`]
    /// so callers can tell "the server responded with garbage" from "the
    /// server did not respond".
    #[error("XML parse error at byte {offset}: {message}")]
    XmlParse { message: String, offset: usize },

    /// A kind-guarded operation was invoked on the wrong element kind.
    #[error("{operation} expects a {expected} element, got {actual}")]
    KindMismatch {
        operation: &'static str,
        expected: ElementKind,
        actual: ElementKind,
    },

    /// The changeset is no longer open on the remote side.
    #[error("changeset {0} is closed")]
    ChangesetClosed(i64),

    /// The response parsed as XML but does not have the shape the entity
    /// normalizer requires.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    /// A `"kind/id"` reference string that does not follow the format.
    #[error("invalid element reference: {0}")]
    InvalidRef(String),

    /// A JSON tree that cannot be serialized back to XML.
    #[error("cannot serialize document: {0}")]
    InvalidDocument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OsmError {
    /// Check if this is a 4xx-class transport error.
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, OsmError::Http { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a 404 transport error.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, OsmError::Http { status: 404, .. })
    }
}

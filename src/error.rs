//! Error types for module generation.

use thiserror::Error;

/// Fatal errors raised while resolving a description and generating a module.
///
/// There is no partial-success mode: any of these aborts the whole run and
/// nothing is written.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("no document URI was supplied")]
    NullInputUri,

    #[error("invalid document URI: {uri}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported swagger version {found} in {uri} (only 1.2 is supported)")]
    SchemaVersionMismatch { uri: String, found: String },

    #[error("unsupported method {method} on {path}")]
    UnsupportedMethod { method: String, path: String },

    #[error("could not retrieve {uri}")]
    Retrieval {
        uri: String,
        #[source]
        source: FetchError,
    },

    #[error("malformed description document {uri}: {reason}")]
    MalformedDocument { uri: String, reason: String },

    #[error("cyclic document reference back to {uri}")]
    CyclicReference { uri: String },

    #[error("failed to write module to {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by a [`crate::fetch::DocumentFetcher`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("HTTP request failed")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("failed to read document")]
    Io(#[source] std::io::Error),

    #[error("unsupported URI scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
}

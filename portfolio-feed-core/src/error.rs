//! Error types for the network-facing parts of the core crate.
//!
//! These errors never cross the public facade: the fetcher, analyzer and
//! [`crate::aggregate::Portfolio`] log them and substitute an empty value.
//! They exist so each call site can tell a transport failure from a
//! non-success status or a malformed payload when it logs.

use thiserror::Error;

/// Failure while talking to the source-control hosting API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("http client could not be built: {0}")]
    Client(String),
}

impl FetchError {
    /// Non-success statuses below 500 are permanent and not worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Decode(_) | FetchError::Client(_) => false,
        }
    }
}

/// Failure while talking to the structured-data backend or blob storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("record store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("record store is not configured")]
    NotConfigured,
}

/// Failure while loading a fallback dataset from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read fallback dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fallback dataset: {0}")]
    Decode(#[from] serde_json::Error),
}

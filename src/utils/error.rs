//! Error types for the ccdc crawler
//!
//! This module defines the domain-specific errors raised by the fetcher,
//! the parsers and the identifier sink.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code returned by the server
    #[error("Server responded with status {status} for {url}")]
    ServerError { status: u16, url: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that can occur while interpreting fetched documents
#[derive(Error, Debug)]
pub enum ParseError {
    /// The seed listing page carries no `{"apiUrl": ...}` config payload
    #[error("No apiUrl config payload found on listing page {0}")]
    ApiUrlNotFound(String),

    /// A listing API page could not be decoded
    #[error("Invalid listing page from {url}: {source}")]
    InvalidListing {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the identifier sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// The output file exists already and must not be appended to
    #[error("Output file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Underlying file I/O failed
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// Nothing in the pipeline retries; the flag only drives error reporting.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::ServerError { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::InvalidUrl(_) => false,
        }
    }
}

//! Error types for the crawler library.

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Errors that can occur while crawling.
///
/// Only the configuration variants ever reach a caller of
/// [`SearchPipeline::search`](crate::SearchPipeline::search); transport
/// failures are absorbed by the [`Fetcher`](crate::Fetcher).
#[derive(Error, Debug)]
pub enum CrawlError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Failed to parse a page.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Malformed proxy specification.
    #[error("Invalid proxy format: {0}")]
    InvalidProxy(String),

    /// Search category outside the supported set.
    #[error("Unsupported search type: {0}")]
    InvalidCategory(String),

    /// Keyword list is empty or blank.
    #[error("Invalid keywords: {0}")]
    InvalidKeywords(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl CrawlError {
    /// Returns true for errors caused by invalid input supplied before any
    /// network call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidProxy(_)
                | Self::InvalidCategory(_)
                | Self::InvalidKeywords(_)
                | Self::Config(_)
        )
    }
}

//! Page retrieval
//!
//! [`Fetcher`] is the seam between the aggregator and the network. The
//! production implementation is [`HttpFetcher`]; tests plug in scripted
//! fetchers.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use http::HttpFetcher;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("fetch cancelled")]
    Cancelled,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid fetcher configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Stable machine-readable label used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Network(_) => "network",
            FetchError::HttpStatus(_) => "http_status",
            FetchError::BodyTooLarge { .. } => "body_too_large",
            FetchError::Cancelled => "cancelled",
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Retrieves the raw content of one page.
///
/// One call is one outbound request. Implementations do not retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

//! reqwest-backed fetcher

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use super::{FetchError, Fetcher, Result};
use crate::config::FetcherConfig;

/// Fetches pages over HTTP(S) with fixed outbound headers.
///
/// Every request carries `Connection: Keep-Alive`, the configured
/// `Accept-Language` and `User-Agent`, and is bounded by a total timeout
/// covering connect, headers and body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: u64,
    fail_on_http_error: bool,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let accept_language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| FetchError::Config(format!("Accept-Language: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes.as_u64(),
            fail_on_http_error: config.fail_on_http_error,
        })
    }

    async fn read_body(&self, mut response: reqwest::Response) -> Result<Bytes> {
        let limit = self.max_body_bytes;

        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::BodyTooLarge { limit });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_request_error)? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!(url, "Starting fetch");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_request_error)?;

        // Any status is a successful fetch unless configured otherwise
        let status = response.status();
        if self.fail_on_http_error && !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = self.read_body(response).await?;

        debug!(url, status = status.as_u16(), size = body.len(), "Fetch completed");

        Ok(body)
    }
}

fn map_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

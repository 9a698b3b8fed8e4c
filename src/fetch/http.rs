//! reqwest-backed fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, RANGE};
use tracing::debug;

use super::local;
use super::{BodyReader, ByteRange, Fetcher, UpstreamHeaders, UpstreamResponse};
use crate::error::{CacheError, Result};

// == HTTP Fetcher ==
/// Fetches `http(s)://` URLs with reqwest and `file://` URLs from disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<UpstreamResponse> {
        if local::is_file_url(url) {
            return local::fetch_file(url, range).await;
        }

        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CacheError::fetch(url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers = UpstreamHeaders {
            content_length: response.content_length(),
            content_range: header_string(&response, CONTENT_RANGE),
            content_type: header_string(&response, CONTENT_TYPE),
        };
        debug!(
            "Upstream {} answered {} (content-length={:?}, content-range={:?})",
            url, status, headers.content_length, headers.content_range
        );

        Ok(UpstreamResponse {
            status,
            headers,
            body: Box::new(ReqwestBody {
                url: url.to_string(),
                response,
            }),
        })
    }
}

fn header_string(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Streams a reqwest response body.
struct ReqwestBody {
    url: String,
    response: reqwest::Response,
}

#[async_trait]
impl BodyReader for ReqwestBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.response
            .chunk()
            .await
            .map_err(|e| CacheError::fetch(&self.url, e.to_string()))
    }
}

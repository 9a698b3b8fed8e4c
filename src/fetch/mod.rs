//! Fetch Module
//!
//! The upstream abstraction the range cache reads through. A [`Fetcher`]
//! issues one request (optionally ranged) and hands back the status, the
//! headers the cache cares about, and a chunked body reader so the caller can
//! stop buffering once a size limit is crossed.

mod http;
mod local;
mod range;

#[cfg(test)]
pub(crate) mod stub;

use std::fmt;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::error::{CacheError, Result};

pub use http::HttpFetcher;
pub use local::is_file_url;
pub use range::{content_range_total, ByteRange};

// == Status Codes ==
pub const STATUS_OK: u16 = 200;
pub const STATUS_PARTIAL_CONTENT: u16 = 206;
pub const STATUS_NOT_IMPLEMENTED: u16 = 501;

// == Fetcher ==
/// Issues upstream requests on behalf of the range cache.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Requests `url`, sending `Range: bytes=...` when `range` is set.
    ///
    /// Transport failures are reported as [`CacheError::Fetch`]; any HTTP
    /// status is returned as-is for the caller to classify.
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<UpstreamResponse>;
}

/// Reads a response body one chunk at a time.
#[async_trait]
pub trait BodyReader: Send {
    /// Next chunk, or `None` once the body is exhausted.
    async fn chunk(&mut self) -> Result<Option<Bytes>>;
}

/// Headers of interest on an upstream response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamHeaders {
    pub content_length: Option<u64>,
    pub content_range: Option<String>,
    pub content_type: Option<String>,
}

/// An upstream response with an unread body.
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: UpstreamHeaders,
    pub body: Box<dyn BodyReader>,
}

impl UpstreamResponse {
    /// Builds a response around an in-memory body.
    pub fn buffered(status: u16, headers: UpstreamHeaders, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body: Box::new(BufferedBody(Some(body))),
        }
    }

    /// Buffers the whole body, failing with [`CacheError::PdfTooLarge`] as soon
    /// as more than `limit` bytes have been received.
    pub async fn read_body(mut self, limit: Option<u64>) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.chunk().await? {
            let received = (buf.len() + chunk.len()) as u64;
            if let Some(limit) = limit {
                if received > limit {
                    return Err(CacheError::PdfTooLarge {
                        size: received,
                        limit,
                    });
                }
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Single-chunk body backed by memory.
struct BufferedBody(Option<Bytes>);

#[async_trait]
impl BodyReader for BufferedBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.0.take().filter(|b| !b.is_empty()))
    }
}

// == Fetch Outcome ==
/// How the upstream answered a ranged request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200: range ignored, the whole document follows.
    Full(UpstreamResponse),
    /// 206: the requested range only.
    Partial(UpstreamResponse),
    /// 501: ranges rejected; retry without a Range header.
    Unsupported,
}

impl FetchOutcome {
    /// Maps a raw response onto the 200/206/501 outcomes; any other status is
    /// a [`CacheError::Fetch`].
    pub fn classify(url: &str, response: UpstreamResponse) -> Result<Self> {
        match response.status {
            STATUS_OK => Ok(FetchOutcome::Full(response)),
            STATUS_PARTIAL_CONTENT => Ok(FetchOutcome::Partial(response)),
            STATUS_NOT_IMPLEMENTED => Ok(FetchOutcome::Unsupported),
            status => Err(CacheError::fetch(
                url,
                format!("unexpected upstream status {}", status),
            )),
        }
    }
}

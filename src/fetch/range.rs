//! Byte range type and header helpers.

use bytes::Bytes;

/// A requested byte range: `length` bytes starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start offset (inclusive).
    pub start: u64,
    /// Number of bytes requested.
    pub length: u64,
}

impl ByteRange {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// End offset (exclusive), saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    /// HTTP Range header value (inclusive end): `bytes=start-(end-1)`.
    ///
    /// A zero-length range still asks for one byte so the upstream reports
    /// the document size.
    pub fn header_value(&self) -> String {
        let last = self.end().saturating_sub(1).max(self.start);
        format!("bytes={}-{}", self.start, last)
    }

    /// Returns `data[start .. min(start + length, data.len())]`.
    ///
    /// Out-of-bounds starts yield an empty slice.
    pub fn slice(&self, data: &Bytes) -> Bytes {
        let total = data.len() as u64;
        let from = self.start.min(total) as usize;
        let to = self.end().min(total) as usize;
        data.slice(from..to)
    }
}

/// Extracts the complete length from a `Content-Range` value.
///
/// Accepts `bytes 0-99/1234` and `bytes */1234`; an unknown length (`/*`)
/// yields `None`.
pub fn content_range_total(value: &str) -> Option<u64> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (_, total) = rest.rsplit_once('/')?;
    total.trim().parse().ok()
}

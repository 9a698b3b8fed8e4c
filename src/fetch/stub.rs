//! Scripted in-memory fetcher for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, Notify};

use super::{ByteRange, Fetcher, UpstreamHeaders, UpstreamResponse};
use crate::error::{CacheError, Result};

/// How the stub upstream treats requests.
#[derive(Debug, Clone)]
pub(crate) enum StubMode {
    /// Always 200 with the full body.
    IgnoresRanges,
    /// 206 slices for ranged requests, 200 otherwise.
    HonorsRanges,
    /// 501 for ranged requests, 200 for plain requests.
    RejectsRanges,
    /// 501 for every request.
    AlwaysUnsupported,
    /// Fixed status with an empty body.
    Status(u16),
    /// 200 advertising this Content-Length, with the real body.
    Advertises(u64),
    /// Transport failure.
    Fails,
}

pub(crate) struct StubFetcher {
    mode: StubMode,
    body: Bytes,
    calls: AtomicUsize,
    ranges: Mutex<VecDeque<Option<ByteRange>>>,
}

impl StubFetcher {
    pub(crate) fn new(mode: StubMode, body: impl Into<Bytes>) -> Self {
        Self {
            mode,
            body: body.into(),
            calls: AtomicUsize::new(0),
            ranges: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Ranges of every request so far, oldest first.
    pub(crate) fn ranges(&self) -> Vec<Option<ByteRange>> {
        self.ranges.lock().unwrap().iter().copied().collect()
    }

    fn full(&self, content_length: u64) -> UpstreamResponse {
        let headers = UpstreamHeaders {
            content_length: Some(content_length),
            content_range: None,
            content_type: Some("application/pdf".to_string()),
        };
        UpstreamResponse::buffered(200, headers, self.body.clone())
    }

    fn partial(&self, range: ByteRange) -> UpstreamResponse {
        let slice = range.slice(&self.body);
        let headers = UpstreamHeaders {
            content_length: Some(slice.len() as u64),
            content_range: Some(format!(
                "bytes {}-{}/{}",
                range.start,
                range.start + (slice.len() as u64).saturating_sub(1),
                self.body.len()
            )),
            content_type: Some("application/pdf".to_string()),
        };
        UpstreamResponse::buffered(206, headers, slice)
    }

    fn status(&self, status: u16) -> UpstreamResponse {
        UpstreamResponse::buffered(status, UpstreamHeaders::default(), Bytes::new())
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push_back(range);

        let total = self.body.len() as u64;
        match (&self.mode, range) {
            (StubMode::IgnoresRanges, _) => Ok(self.full(total)),
            (StubMode::HonorsRanges, Some(range)) => Ok(self.partial(range)),
            (StubMode::HonorsRanges, None) => Ok(self.full(total)),
            (StubMode::RejectsRanges, Some(_)) => Ok(self.status(501)),
            (StubMode::RejectsRanges, None) => Ok(self.full(total)),
            (StubMode::AlwaysUnsupported, _) => Ok(self.status(501)),
            (StubMode::Status(status), _) => Ok(self.status(*status)),
            (StubMode::Advertises(length), _) => Ok(self.full(*length)),
            (StubMode::Fails, _) => Err(CacheError::fetch(url, "connection refused")),
        }
    }
}

/// Full-body fetcher that parks every request until the test releases it.
///
/// Request `n` announces itself on the channel from [`GatedFetcher::new`],
/// waits for `release(n)` and then answers 200 with `bodies[n]`.
pub(crate) struct GatedFetcher {
    bodies: Vec<Bytes>,
    gates: Vec<Notify>,
    entered: mpsc::UnboundedSender<usize>,
    calls: AtomicUsize,
}

impl GatedFetcher {
    pub(crate) fn new(bodies: Vec<Bytes>) -> (Self, mpsc::UnboundedReceiver<usize>) {
        let (entered, rx) = mpsc::unbounded_channel();
        let gates = bodies.iter().map(|_| Notify::new()).collect();
        let fetcher = Self {
            bodies,
            gates,
            entered,
            calls: AtomicUsize::new(0),
        };
        (fetcher, rx)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self, call: usize) {
        self.gates[call].notify_one();
    }
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(&self, url: &str, _range: Option<ByteRange>) -> Result<UpstreamResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(body) = self.bodies.get(call).cloned() else {
            return Err(CacheError::fetch(url, "no scripted response left"));
        };
        let _ = self.entered.send(call);
        self.gates[call].notified().await;

        let headers = UpstreamHeaders {
            content_length: Some(body.len() as u64),
            ..UpstreamHeaders::default()
        };
        Ok(UpstreamResponse::buffered(200, headers, body))
    }
}

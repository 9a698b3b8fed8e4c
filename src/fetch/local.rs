//! Serving `file://` URLs from the local filesystem.
//!
//! Responses mimic a range-capable HTTP server: ranged reads answer 206 with a
//! `Content-Range`, plain reads answer 200 with the whole file.

use std::io::SeekFrom;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::{
    BodyReader, ByteRange, UpstreamHeaders, UpstreamResponse, STATUS_OK, STATUS_PARTIAL_CONTENT,
};
use crate::error::{CacheError, Result};
use crate::validation::file_url_to_path;

const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Returns true for `file:` URLs (case-insensitive scheme).
pub fn is_file_url(url: &str) -> bool {
    url.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"))
}

pub(super) async fn fetch_file(url: &str, range: Option<ByteRange>) -> Result<UpstreamResponse> {
    let path = file_url_to_path(url)
        .ok_or_else(|| CacheError::fetch(url, "invalid file URL"))?;

    let mut file = File::open(&path)
        .await
        .map_err(|e| CacheError::fetch(url, format!("{}: {}", path.display(), e)))?;
    let total = file
        .metadata()
        .await
        .map_err(|e| CacheError::fetch(url, e.to_string()))?
        .len();

    let Some(range) = range else {
        let headers = UpstreamHeaders {
            content_length: Some(total),
            content_range: None,
            content_type: Some("application/pdf".to_string()),
        };
        return Ok(UpstreamResponse {
            status: STATUS_OK,
            headers,
            body: Box::new(FileBody {
                url: url.to_string(),
                file,
            }),
        });
    };

    let start = range.start.min(total);
    let end = range.end().min(total);
    let mut data = vec![0u8; (end - start) as usize];
    if !data.is_empty() {
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| CacheError::fetch(url, e.to_string()))?;
        file.read_exact(&mut data)
            .await
            .map_err(|e| CacheError::fetch(url, e.to_string()))?;
    }

    let content_range = if data.is_empty() {
        format!("bytes */{}", total)
    } else {
        format!("bytes {}-{}/{}", start, end - 1, total)
    };
    let headers = UpstreamHeaders {
        content_length: Some(data.len() as u64),
        content_range: Some(content_range),
        content_type: Some("application/pdf".to_string()),
    };
    Ok(UpstreamResponse::buffered(
        STATUS_PARTIAL_CONTENT,
        headers,
        Bytes::from(data),
    ))
}

/// Streams a whole file in fixed-size chunks.
struct FileBody {
    url: String,
    file: File,
}

#[async_trait]
impl BodyReader for FileBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(FILE_CHUNK_SIZE);
        let read = self
            .file
            .read_buf(&mut buf)
            .await
            .map_err(|e| CacheError::fetch(&self.url, e.to_string()))?;
        Ok((read > 0).then(|| buf.freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::content_range_total;
    use crate::validation::path_to_file_url;
    use std::io::Write;

    fn pdf_fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7 local body").unwrap();
        file
    }

    #[test]
    fn test_is_file_url() {
        assert!(is_file_url("file:///tmp/a.pdf"));
        assert!(is_file_url("FILE:///tmp/a.pdf"));
        assert!(!is_file_url("https://example.com/a.pdf"));
        assert!(!is_file_url("fil"));
    }

    #[tokio::test]
    async fn test_ranged_read_is_partial() {
        let fixture = pdf_fixture();
        let url = path_to_file_url(fixture.path());

        let resp = fetch_file(&url, Some(ByteRange::new(0, 8))).await.unwrap();
        assert_eq!(resp.status, STATUS_PARTIAL_CONTENT);
        let total = resp
            .headers
            .content_range
            .as_deref()
            .and_then(content_range_total);
        assert_eq!(total, Some(19));
        assert_eq!(resp.read_body(None).await.unwrap(), Bytes::from_static(b"%PDF-1.7"));
    }

    #[tokio::test]
    async fn test_range_past_end_is_empty() {
        let fixture = pdf_fixture();
        let url = path_to_file_url(fixture.path());

        let resp = fetch_file(&url, Some(ByteRange::new(100, 8))).await.unwrap();
        assert_eq!(resp.headers.content_range.as_deref(), Some("bytes */19"));
        assert!(resp.read_body(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plain_read_is_full() {
        let fixture = pdf_fixture();
        let url = path_to_file_url(fixture.path());

        let resp = fetch_file(&url, None).await.unwrap();
        assert_eq!(resp.status, STATUS_OK);
        assert_eq!(resp.headers.content_length, Some(19));
        assert_eq!(resp.read_body(None).await.unwrap().len(), 19);
    }

    #[tokio::test]
    async fn test_plain_read_streams_in_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..FILE_CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        file.write_all(&data).unwrap();
        let url = path_to_file_url(file.path());

        let mut resp = fetch_file(&url, None).await.unwrap();
        let first = resp.body.chunk().await.unwrap().unwrap();
        assert!(first.len() <= FILE_CHUNK_SIZE);

        let resp = fetch_file(&url, None).await.unwrap();
        assert_eq!(resp.read_body(None).await.unwrap(), Bytes::from(data));
    }

    #[tokio::test]
    async fn test_plain_read_stops_at_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'x'; FILE_CHUNK_SIZE * 3]).unwrap();
        let url = path_to_file_url(file.path());

        let resp = fetch_file(&url, None).await.unwrap();
        let err = resp.read_body(Some(FILE_CHUNK_SIZE as u64)).await.unwrap_err();
        assert!(matches!(err, CacheError::PdfTooLarge { limit, .. } if limit == FILE_CHUNK_SIZE as u64));
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = path_to_file_url(&dir.path().join("missing.pdf"));

        let err = fetch_file(&url, None).await.unwrap_err();
        assert!(matches!(err, CacheError::Fetch { .. }));
    }
}

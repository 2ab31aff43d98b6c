//! Resumable upload session over the YouTube upload protocol.
//!
//! 1. `POST` the metadata with `uploadType=resumable`; the session URI comes
//!    back in `Location`.
//! 2. `PUT` byte ranges to the session URI. `308` means "more please" and
//!    carries the committed prefix in `Range`; `200`/`201` carries the
//!    created resource.
//! 3. After a failed `PUT` the committed offset is unknown, so the next call
//!    first asks with `Content-Range: bytes */total`.

use super::{ChunkStatus, ChunkedUpload, UploadError};
use crate::http::{self, parse_range_end, Body, HttpResponse, Method};
use crate::progress::UploadProgress;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Chunk sizes must be multiples of this (256 KiB).
pub const CHUNK_GRANULARITY: u64 = 256 * 1024;

/// One in-progress transfer of a local file.
///
/// Owns the byte offset; the retry driver only decides whether to call
/// [`ChunkedUpload::next_chunk`] again.
#[derive(Debug)]
pub struct ResumableSession {
    init_url: String,
    metadata: Vec<u8>,
    auth_header: String,
    content_type: String,
    path: PathBuf,
    file: File,
    total: u64,
    chunk_size: Option<u64>,
    session_uri: Option<String>,
    offset: u64,
    needs_sync: bool,
}

impl ResumableSession {
    /// Opens `path` for upload. Nothing is sent until the first `next_chunk`.
    ///
    /// `chunk_size` of `None` sends the whole file in one request; otherwise
    /// it is rounded down to a multiple of [`CHUNK_GRANULARITY`].
    pub fn open(
        init_url: impl Into<String>,
        metadata: Vec<u8>,
        access_token: &str,
        path: &Path,
        chunk_size: Option<u64>,
    ) -> Result<Self, UploadError> {
        let file = File::open(path)?;
        let total = file.metadata()?.len();
        Ok(Self {
            init_url: init_url.into(),
            metadata,
            auth_header: format!("Authorization: Bearer {}", access_token),
            content_type: guess_content_type(path).to_string(),
            path: path.to_path_buf(),
            file,
            total,
            chunk_size: chunk_size.map(normalize_chunk_size),
            session_uri: None,
            offset: 0,
            needs_sync: false,
        })
    }

    pub fn total_bytes(&self) -> u64 {
        self.total
    }

    /// Bytes the server has acknowledged.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn session_uri(&self) -> Option<&str> {
        self.session_uri.as_deref()
    }

    fn initiate(&self) -> Result<String, UploadError> {
        let headers = vec![
            self.auth_header.clone(),
            "Content-Type: application/json; charset=UTF-8".to_string(),
            format!("X-Upload-Content-Length: {}", self.total),
            format!("X-Upload-Content-Type: {}", self.content_type),
        ];
        let mut src: &[u8] = &self.metadata;
        let len = self.metadata.len() as u64;
        let resp = http::perform(Method::Post, &self.init_url, &headers, Some(Body::new(&mut src, len)))?;
        if !resp.is_success() {
            return Err(UploadError::Http {
                status: resp.status,
                body: resp.body_text(),
            });
        }
        let uri = resp
            .header("Location")
            .ok_or_else(|| UploadError::Protocol("no session URI in Location header".to_string()))?;
        tracing::info!(path = %self.path.display(), total = self.total, "resumable session started");
        Ok(uri.to_string())
    }

    fn query_offset(&mut self, uri: &str) -> Result<ChunkStatus, UploadError> {
        let headers = vec![
            self.auth_header.clone(),
            format!("Content-Range: bytes */{}", self.total),
        ];
        let resp = http::perform(Method::Put, uri, &headers, None)?;
        let status = self.interpret(resp)?;
        tracing::debug!(offset = self.offset, "resynchronised upload offset");
        Ok(status)
    }

    fn send_chunk(&mut self, uri: &str) -> Result<ChunkStatus, UploadError> {
        let remaining = self.total.saturating_sub(self.offset);
        let len = self.chunk_size.map_or(remaining, |c| c.min(remaining));
        let range = if len == 0 {
            format!("bytes */{}", self.total)
        } else {
            format!("bytes {}-{}/{}", self.offset, self.offset + len - 1, self.total)
        };
        let headers = vec![
            self.auth_header.clone(),
            format!("Content-Type: {}", self.content_type),
            format!("Content-Range: {}", range),
        ];

        self.file.seek(SeekFrom::Start(self.offset))?;
        let mut reader = (&self.file).take(len);
        tracing::debug!(%range, "sending chunk");
        let resp = http::perform(Method::Put, uri, &headers, Some(Body::new(&mut reader, len)))?;
        self.interpret(resp)
    }

    fn interpret(&mut self, resp: HttpResponse) -> Result<ChunkStatus, UploadError> {
        match resp.status {
            308 => {
                // No Range header means nothing has been persisted yet.
                self.offset = resp
                    .header("Range")
                    .and_then(parse_range_end)
                    .map_or(0, |end| end + 1);
                Ok(ChunkStatus::Pending(UploadProgress::new(self.offset, self.total)))
            }
            200 | 201 => {
                self.offset = self.total;
                resp.json()
                    .map(ChunkStatus::Complete)
                    .map_err(|e| UploadError::Protocol(format!("unparseable terminal response: {}", e)))
            }
            status => Err(UploadError::Http {
                status,
                body: resp.body_text(),
            }),
        }
    }
}

impl ChunkedUpload for ResumableSession {
    fn next_chunk(&mut self) -> Result<ChunkStatus, UploadError> {
        let uri = match &self.session_uri {
            Some(uri) => uri.clone(),
            None => {
                let uri = self.initiate()?;
                self.session_uri = Some(uri.clone());
                uri
            }
        };

        if self.needs_sync {
            if let ChunkStatus::Complete(resource) = self.query_offset(&uri)? {
                self.needs_sync = false;
                return Ok(ChunkStatus::Complete(resource));
            }
        }

        // Cleared only once the server has answered this chunk.
        self.needs_sync = true;
        let status = self.send_chunk(&uri)?;
        self.needs_sync = false;
        Ok(status)
    }
}

/// Round a requested chunk size down to the protocol granularity (min one unit).
pub(crate) fn normalize_chunk_size(requested: u64) -> u64 {
    (requested / CHUNK_GRANULARITY).max(1) * CHUNK_GRANULARITY
}

/// MIME type for `X-Upload-Content-Type`, from the file extension.
pub(crate) fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("mpg") | Some("mpeg") => "video/mpeg",
        Some("3gp") => "video/3gpp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn chunk_size_rounds_down_to_granularity() {
        assert_eq!(normalize_chunk_size(1), CHUNK_GRANULARITY);
        assert_eq!(normalize_chunk_size(CHUNK_GRANULARITY), CHUNK_GRANULARITY);
        assert_eq!(normalize_chunk_size(CHUNK_GRANULARITY * 3 + 17), CHUNK_GRANULARITY * 3);
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type(Path::new("a/clip.MP4")), "video/mp4");
        assert_eq!(guess_content_type(Path::new("b.mkv")), "video/x-matroska");
        assert_eq!(guess_content_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn open_missing_file_is_local_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResumableSession::open(
            "http://127.0.0.1:1/upload",
            Vec::new(),
            "token",
            &dir.path().join("missing.mp4"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::LocalIo(_)));
    }

    #[test]
    fn open_records_size_and_normalised_chunk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[7u8; 1000]).unwrap();
        f.flush().unwrap();
        let s = ResumableSession::open("http://x/", Vec::new(), "t", f.path(), Some(10)).unwrap();
        assert_eq!(s.total_bytes(), 1000);
        assert_eq!(s.offset(), 0);
        assert_eq!(s.chunk_size, Some(CHUNK_GRANULARITY));
        assert!(s.session_uri().is_none());
    }

    #[test]
    fn interpret_308_tracks_committed_prefix() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let mut s = ResumableSession::open("http://x/", Vec::new(), "t", f.path(), None).unwrap();
        s.total = 1024;
        let resp = HttpResponse {
            status: 308,
            headers: vec!["Range: bytes=0-511".to_string()],
            body: Vec::new(),
        };
        match s.interpret(resp).unwrap() {
            ChunkStatus::Pending(p) => assert_eq!(p, UploadProgress::new(512, 1024)),
            other => panic!("expected pending, got {other:?}"),
        }

        let reset = HttpResponse {
            status: 308,
            headers: Vec::new(),
            body: Vec::new(),
        };
        s.interpret(reset).unwrap();
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn interpret_error_and_bad_json() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let mut s = ResumableSession::open("http://x/", Vec::new(), "t", f.path(), None).unwrap();
        let err = s
            .interpret(HttpResponse {
                status: 503,
                headers: Vec::new(),
                body: b"backend error".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, UploadError::Http { status: 503, ref body } if body == "backend error"));

        let err = s
            .interpret(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, UploadError::Protocol(_)));
    }
}

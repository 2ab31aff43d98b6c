//! Blocking YouTube Data API v3 client: video inserts and caption inserts.
//!
//! Only the calls ytup needs. All requests carry the bearer token handed in
//! by the caller (see [`crate::auth`]).

use crate::captions::{CaptionInserter, CaptionResource, CaptionTrack};
use crate::http::{self, Body, Method};
use crate::metadata::VideoMetadata;
use crate::upload::{ResumableSession, UploadError};
use rand::Rng;
use serde_json::json;
use std::path::Path;

pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Public watch page of a video.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    access_token: String,
    upload_base: String,
}

impl YouTubeClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }

    /// Point uploads at another base URL (e.g. a local test server).
    pub fn with_upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn upload_base(&self) -> &str {
        &self.upload_base
    }

    /// Prepare a resumable `videos.insert` for `path`.
    ///
    /// Fails only on local problems (missing file, unserialisable metadata);
    /// the session is started by the first `next_chunk` so that starting it
    /// is retried like any other chunk.
    pub fn begin_video_upload(
        &self,
        metadata: &VideoMetadata,
        path: &Path,
        chunk_size: Option<u64>,
    ) -> Result<ResumableSession, UploadError> {
        let body = metadata
            .to_request_body()
            .map_err(|e| UploadError::Protocol(format!("encoding metadata: {}", e)))?;
        let url = format!(
            "{}/videos?uploadType=resumable&part={}",
            self.upload_base,
            VideoMetadata::PARTS
        );
        tracing::debug!(%url, path = %path.display(), "preparing video upload");
        ResumableSession::open(url, body, &self.access_token, path, chunk_size)
    }
}

impl CaptionInserter for YouTubeClient {
    /// `captions.insert` as one `multipart/related` request (snippet + file).
    fn insert_caption(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<CaptionResource, UploadError> {
        let media = std::fs::read(&track.path)?;
        let snippet = json!({
            "snippet": {
                "videoId": video_id,
                "language": track.language,
                "name": track.name,
                "isDraft": false,
            }
        });
        let boundary = format!("ytup_{:016x}", rand::thread_rng().gen::<u64>());
        let body = multipart_related(&boundary, snippet.to_string().as_bytes(), &media);

        let url = format!(
            "{}/captions?uploadType=multipart&part=snippet",
            self.upload_base
        );
        let headers = vec![
            format!("Authorization: Bearer {}", self.access_token),
            format!("Content-Type: multipart/related; boundary={}", boundary),
        ];
        let mut src: &[u8] = &body;
        let resp = http::perform(
            Method::Post,
            &url,
            &headers,
            Some(Body::new(&mut src, body.len() as u64)),
        )?;
        if !resp.is_success() {
            return Err(UploadError::Http {
                status: resp.status,
                body: resp.body_text(),
            });
        }
        serde_json::from_slice(&resp.body)
            .map_err(|e| UploadError::Protocol(format!("unparseable caption response: {}", e)))
    }
}

/// Two-part `multipart/related` body: JSON metadata then the media bytes.
fn multipart_related(boundary: &str, json: &[u8], media: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(json.len() + media.len() + 256);
    out.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    out.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    out.extend_from_slice(json);
    out.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    out.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    out.extend_from_slice(media);
    out.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    out
}

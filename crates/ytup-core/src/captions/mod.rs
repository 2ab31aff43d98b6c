//! Caption tracks: argument parsing, single inserts and batches.
//!
//! A caption failure never aborts a batch; each track is attempted in turn
//! and the caller gets a tally of successes.

mod batch;
mod parse;

pub use batch::{upload_captions, CaptionEvent, CaptionSummary};
pub use parse::{parse_caption_arg, CaptionArgError};

use crate::upload::UploadError;
use serde::Deserialize;
use std::path::PathBuf;

/// One caption track to attach to a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code (e.g. `en`, `es`, `hi`).
    pub language: String,
    /// Display name of the track.
    pub name: String,
    /// Local caption file (.srt, .sbv, .vtt, ...).
    pub path: PathBuf,
}

/// Caption resource returned by `captions.insert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptionResource {
    pub id: String,
    #[serde(default)]
    pub snippet: CaptionSnippet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSnippet {
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_draft: bool,
}

/// Attaches a caption track to a video in one (non-resumable) request.
pub trait CaptionInserter {
    fn insert_caption(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<CaptionResource, UploadError>;
}

//! Upload several caption tracks one after another.

use super::{parse_caption_arg, CaptionArgError, CaptionInserter, CaptionResource, CaptionTrack};
use crate::upload::UploadError;
use std::path::Path;

/// Successes out of arguments given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptionSummary {
    pub succeeded: usize,
    pub attempted: usize,
}

impl CaptionSummary {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.attempted
    }
}

/// Per-track outcome reported while a batch runs.
#[derive(Debug)]
pub enum CaptionEvent<'a> {
    /// Argument could not be parsed; skipped.
    Invalid { arg: &'a str, error: CaptionArgError },
    /// Caption file does not exist; skipped.
    MissingFile { track: &'a CaptionTrack },
    /// About to upload track `index` (1-based) of `total`.
    Uploading {
        index: usize,
        total: usize,
        track: &'a CaptionTrack,
    },
    Uploaded {
        track: &'a CaptionTrack,
        resource: &'a CaptionResource,
    },
    Failed {
        track: &'a CaptionTrack,
        error: &'a UploadError,
    },
}

/// Parse and upload each caption argument in order.
///
/// Invalid arguments, missing files and failed uploads are reported through
/// `on_event` and skipped; they never stop the remaining tracks.
pub fn upload_captions<A, S>(
    api: &A,
    video_id: &str,
    args: &[S],
    mut on_event: impl FnMut(CaptionEvent<'_>),
) -> CaptionSummary
where
    A: CaptionInserter + ?Sized,
    S: AsRef<str>,
{
    let total = args.len();
    let mut summary = CaptionSummary {
        succeeded: 0,
        attempted: total,
    };

    for (i, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        let track = match parse_caption_arg(arg) {
            Ok(track) => track,
            Err(error) => {
                tracing::warn!("skipping caption argument: {}", error);
                on_event(CaptionEvent::Invalid { arg, error });
                continue;
            }
        };

        if !Path::new(&track.path).exists() {
            tracing::warn!(path = %track.path.display(), "caption file not found");
            on_event(CaptionEvent::MissingFile { track: &track });
            continue;
        }

        on_event(CaptionEvent::Uploading {
            index: i + 1,
            total,
            track: &track,
        });
        match api.insert_caption(video_id, &track) {
            Ok(resource) => {
                tracing::info!(id = %resource.id, language = %track.language, "caption uploaded");
                summary.succeeded += 1;
                on_event(CaptionEvent::Uploaded {
                    track: &track,
                    resource: &resource,
                });
            }
            Err(error) => {
                tracing::warn!(language = %track.language, "caption upload failed: {}", error);
                on_event(CaptionEvent::Failed {
                    track: &track,
                    error: &error,
                });
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        attempted = summary.attempted,
        "caption batch finished"
    );
    summary
}

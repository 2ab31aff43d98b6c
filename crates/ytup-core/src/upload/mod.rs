//! Chunked (resumable) uploads.
//!
//! [`ChunkedUpload`] is the seam between the retry driver and whatever moves
//! bytes: the curl-backed [`ResumableSession`] in production, scripted fakes
//! in tests.

mod error;
mod session;

pub use error::UploadError;
pub use session::{ResumableSession, CHUNK_GRANULARITY};

use crate::progress::UploadProgress;
use serde_json::Value;

/// Result of advancing an upload by one chunk.
#[derive(Debug, Clone)]
pub enum ChunkStatus {
    /// The chunk was accepted; more remain.
    Pending(UploadProgress),
    /// The server accepted the last byte and returned the created resource.
    Complete(Value),
}

/// An upload that can be advanced one chunk at a time.
///
/// Implementations own the byte offset; callers only decide whether to call
/// again after a failure.
pub trait ChunkedUpload {
    fn next_chunk(&mut self) -> Result<ChunkStatus, UploadError>;
}

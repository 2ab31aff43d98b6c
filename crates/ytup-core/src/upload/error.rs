//! Upload error type for retry classification.

use crate::http::TransferError;
use serde_json::Value;

/// Failure of a single upload request or of a whole driven upload.
///
/// Kept as an enum (rather than `anyhow`) so the retry driver can classify
/// it before callers convert to `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The remote call completed with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u32, body: String },
    /// The transfer failed before a status was received.
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// Reading the local file failed. Not retried.
    #[error("local file: {0}")]
    LocalIo(#[from] std::io::Error),
    /// A terminal response without the expected `id` field.
    #[error("the upload failed with an unexpected response: {0}")]
    MalformedResponse(Value),
    /// Transient failures persisted past the retry budget.
    #[error("no longer attempting to retry after {retries} retries (last error: {last})")]
    RetriesExhausted { retries: u32, last: String },
    /// The server broke the resumable protocol (missing session URI, bad JSON).
    #[error("protocol: {0}")]
    Protocol(String),
}

impl From<TransferError> for UploadError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Curl(ce) => UploadError::Transport(ce),
            TransferError::Body(io) => UploadError::LocalIo(io),
        }
    }
}

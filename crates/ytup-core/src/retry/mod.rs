//! Retry and backoff policy for resumable uploads.
//!
//! This module classifies upload failures (HTTP status, transport errors,
//! local file errors), decides on bounded exponential backoff with jitter,
//! and drives a chunked upload to its terminal response.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use policy::{
    ErrorKind, RetryDecision, RetryPolicy, TransportKind, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRIABLE_STATUS_CODES, MAX_RETRIES_LIMIT,
};
pub use run::{DriveEvent, UploadDriver, UploadOutcome};

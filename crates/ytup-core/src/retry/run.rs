//! Retry loop: advance a chunked upload until it completes or the policy says stop.

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::progress::UploadProgress;
use crate::upload::{ChunkStatus, ChunkedUpload, UploadError};
use rand::RngCore;
use serde_json::Value;
use std::time::Duration;

/// Something worth reporting while an upload is being driven.
#[derive(Debug, Clone)]
pub enum DriveEvent {
    /// About to request the next chunk transfer.
    Attempt { retries: u32 },
    /// A chunk was accepted and more remain.
    Progress(UploadProgress),
    /// A transient failure; the driver will sleep and try again.
    Retrying {
        error: String,
        retry: u32,
        sleep: Duration,
        cap: Duration,
    },
    /// The upload finished with a valid resource id.
    Completed { id: String },
}

/// Terminal success of a driven upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// `id` field of the terminal response.
    pub id: String,
    /// Full terminal response body.
    pub response: Value,
    /// Number of transient failures that were retried.
    pub retries: u32,
}

/// Drives a [`ChunkedUpload`] to completion under a [`RetryPolicy`].
///
/// Sleeping, randomness and event reporting are pluggable so the same loop
/// runs in the CLI (real sleeps) and in tests (recorded sleeps).
pub struct UploadDriver<'a> {
    policy: &'a RetryPolicy,
    rng: Box<dyn RngCore + 'a>,
    sleep: Box<dyn FnMut(Duration) + 'a>,
    observer: Box<dyn FnMut(&DriveEvent) + 'a>,
}

impl<'a> UploadDriver<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            rng: Box::new(rand::thread_rng()),
            sleep: Box::new(std::thread::sleep),
            observer: Box::new(|_| {}),
        }
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'a) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_sleep(mut self, sleep: impl FnMut(Duration) + 'a) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn on_event(mut self, observer: impl FnMut(&DriveEvent) + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Runs the upload until a terminal response arrives.
    ///
    /// At most `max_retries + 1` failed attempts are made. Failures outside
    /// the policy's retriable set are returned on first occurrence without
    /// sleeping; a terminal response without an `id` is fatal.
    pub fn drive<U>(&mut self, upload: &mut U) -> Result<UploadOutcome, UploadError>
    where
        U: ChunkedUpload + ?Sized,
    {
        let mut retries = 0u32;
        loop {
            (self.observer)(&DriveEvent::Attempt { retries });
            let err = match upload.next_chunk() {
                Ok(ChunkStatus::Complete(response)) => {
                    let id = match response.get("id").and_then(Value::as_str) {
                        Some(id) => id.to_string(),
                        None => {
                            tracing::error!("terminal response has no id: {}", response);
                            return Err(UploadError::MalformedResponse(response));
                        }
                    };
                    tracing::info!(id = %id, retries, "upload complete");
                    (self.observer)(&DriveEvent::Completed { id: id.clone() });
                    return Ok(UploadOutcome {
                        id,
                        response,
                        retries,
                    });
                }
                Ok(ChunkStatus::Pending(progress)) => {
                    tracing::debug!(
                        sent = progress.bytes_sent,
                        total = progress.total_bytes,
                        "chunk accepted"
                    );
                    (self.observer)(&DriveEvent::Progress(progress));
                    continue;
                }
                Err(e) => e,
            };

            let kind = classify::classify(&err);
            match self.policy.decide(retries + 1, kind, &mut *self.rng) {
                RetryDecision::NoRetry => {
                    tracing::warn!("non-retriable upload failure: {}", err);
                    return Err(err);
                }
                RetryDecision::GiveUp => {
                    tracing::error!(retries, "no longer attempting to retry: {}", err);
                    return Err(UploadError::RetriesExhausted {
                        retries,
                        last: err.to_string(),
                    });
                }
                RetryDecision::RetryAfter { sleep, cap } => {
                    retries += 1;
                    let error = match &err {
                        UploadError::Http { status, body } => {
                            format!("A retriable HTTP error {} occurred:\n{}", status, body)
                        }
                        other => format!("A retriable error occurred: {}", other),
                    };
                    tracing::warn!(retry = retries, ?sleep, "{}", error);
                    (self.observer)(&DriveEvent::Retrying {
                        error,
                        retry: retries,
                        sleep,
                        cap,
                    });
                    (self.sleep)(sleep);
                }
            }
        }
    }
}

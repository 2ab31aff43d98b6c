use rand::Rng;
use std::time::Duration;

/// Transport-level failure kinds that a policy may treat as transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connect, read or low-speed timeout.
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, send/recv).
    Connection,
}

/// High-level classification of an upload failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote call completed with this HTTP status.
    Http(u32),
    /// The transfer itself failed before a status was received.
    Transport(TransportKind),
    /// Anything else (local file errors, malformed responses). Never retried.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Failure is not in the retriable set; propagate it as-is.
    NoRetry,
    /// Failure is retriable but the retry budget is spent.
    GiveUp,
    /// Retry after sleeping for `sleep` (a random fraction of `cap`).
    RetryAfter { sleep: Duration, cap: Duration },
}

/// Bounded exponential backoff with full jitter.
///
/// Retry `r` (1-based) sleeps for `uniform[0, 1) * 2^r` backoff units.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// HTTP status codes that are retried.
    pub retriable_status_codes: Vec<u32>,
    /// Transport failure kinds that are retried.
    pub retriable_transport: Vec<TransportKind>,
    /// Length of one backoff unit (one second in production).
    pub backoff_unit: Duration,
}

pub const DEFAULT_MAX_RETRIES: u32 = 10;
/// Largest retry count whose backoff cap (`2^r` units) still fits in a `u32` factor.
pub const MAX_RETRIES_LIMIT: u32 = 31;
pub const DEFAULT_RETRIABLE_STATUS_CODES: [u32; 4] = [500, 502, 503, 504];

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retriable_status_codes: DEFAULT_RETRIABLE_STATUS_CODES.to_vec(),
            retriable_transport: vec![TransportKind::Connection, TransportKind::Timeout],
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn is_retriable(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Http(code) => self.retriable_status_codes.contains(&code),
            ErrorKind::Transport(t) => self.retriable_transport.contains(&t),
            ErrorKind::Other => false,
        }
    }

    /// Upper bound (exclusive) of the sleep before retry number `retry`.
    pub fn backoff_cap(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Decide what to do about a failure of `kind` that would become retry
    /// number `retry` (1-based).
    pub fn decide<R: Rng + ?Sized>(&self, retry: u32, kind: ErrorKind, rng: &mut R) -> RetryDecision {
        if !self.is_retriable(kind) {
            return RetryDecision::NoRetry;
        }
        if retry > self.max_retries {
            return RetryDecision::GiveUp;
        }
        let cap = self.backoff_cap(retry);
        let mut sleep = cap.mul_f64(rng.gen::<f64>());
        // Float rounding on very large caps must not reach the bound.
        if sleep >= cap && !cap.is_zero() {
            sleep = cap - Duration::from_nanos(1);
        }
        RetryDecision::RetryAfter { sleep, cap }
    }
}

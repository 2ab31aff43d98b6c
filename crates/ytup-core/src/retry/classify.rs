//! Classify upload failures into retry policy error kinds.

use crate::retry::policy::{ErrorKind, TransportKind};
use crate::upload::UploadError;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Transport(TransportKind::Timeout);
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
        || e.is_ssl_connect_error()
    {
        return ErrorKind::Transport(TransportKind::Connection);
    }
    ErrorKind::Other
}

/// Classify an upload error into an ErrorKind.
///
/// Local file errors are never transient: a file that cannot be read now will
/// not become readable by waiting.
pub fn classify(e: &UploadError) -> ErrorKind {
    match e {
        UploadError::Http { status, .. } => ErrorKind::Http(*status),
        UploadError::Transport(ce) => classify_curl_error(ce),
        UploadError::LocalIo(_)
        | UploadError::MalformedResponse(_)
        | UploadError::RetriesExhausted { .. }
        | UploadError::Protocol(_) => ErrorKind::Other,
    }
}

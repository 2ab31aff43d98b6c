//! Blocking HTTP requests over libcurl.
//!
//! One `Easy` handle per request. Request bodies are streamed from any
//! `Read` so a multi-gigabyte chunk never has to sit in memory; response
//! headers and body are captured whole (API responses are small JSON).

mod parse;

pub use parse::{find_header, parse_range_end};

use curl::easy::{Easy, List, ReadError};
use std::io::Read;
use std::str;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

/// Failure to complete an HTTP exchange (no status was received).
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("transport: {0}")]
    Curl(#[from] curl::Error),
    /// Reading the request body from its source failed (e.g. local disk error).
    #[error("reading request body: {0}")]
    Body(#[source] std::io::Error),
}

/// Status, header lines and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Last value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// A request body: a reader and the exact number of bytes it will yield.
pub struct Body<'a> {
    reader: &'a mut dyn Read,
    len: u64,
}

impl<'a> Body<'a> {
    pub fn new(reader: &'a mut dyn Read, len: u64) -> Self {
        Self { reader, len }
    }
}

/// Performs one request and returns the response, whatever its status.
///
/// `headers` are full header lines (`"Name: value"`). `Expect: 100-continue`
/// is always suppressed. Runs in the current thread.
pub fn perform(
    method: Method,
    url: &str,
    headers: &[String],
    body: Option<Body<'_>>,
) -> Result<HttpResponse, TransferError> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Abort if throughput drops below 1 KiB/s for 60s rather than imposing a
    // wall-clock limit on multi-gigabyte chunks.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    let body_len = body.as_ref().map_or(0, |b| b.len);
    match method {
        Method::Post => {
            easy.post(true)?;
            easy.post_field_size(body_len)?;
        }
        Method::Put => {
            easy.upload(true)?;
            easy.in_filesize(body_len)?;
        }
    }

    let mut list = List::new();
    for h in headers {
        list.append(h)?;
    }
    list.append("Expect:")?;
    easy.http_headers(list)?;

    let mut response_headers: Vec<String> = Vec::new();
    let mut response_body: Vec<u8> = Vec::new();
    let mut body_error: Option<std::io::Error> = None;
    let result = {
        let body_error_slot = &mut body_error;
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                response_headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            response_body.extend_from_slice(data);
            Ok(data.len())
        })?;
        if let Some(body) = body {
            let reader = body.reader;
            transfer.read_function(move |buf| match reader.read(buf) {
                Ok(n) => Ok(n),
                Err(e) => {
                    *body_error_slot = Some(e);
                    Err(ReadError::Abort)
                }
            })?;
        }
        transfer.perform()
    };

    if let Err(e) = result {
        if let Some(io_err) = body_error {
            return Err(TransferError::Body(io_err));
        }
        return Err(TransferError::Curl(e));
    }

    let status = easy.response_code()?;
    tracing::debug!(?method, url, status, "http exchange complete");
    Ok(HttpResponse {
        status,
        headers: response_headers,
        body: response_body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u32, headers: &[&str]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers.iter().map(|s| s.to_string()).collect(),
            body: br#"{"id":"x"}"#.to_vec(),
        }
    }

    #[test]
    fn success_range() {
        assert!(response(200, &[]).is_success());
        assert!(response(201, &[]).is_success());
        assert!(!response(308, &[]).is_success());
        assert!(!response(503, &[]).is_success());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let r = response(200, &["HTTP/1.1 200 OK", "location: https://up/1"]);
        assert_eq!(r.header("Location"), Some("https://up/1"));
        assert_eq!(r.json().unwrap()["id"], "x");
    }
}

//! Minimal HTTP/1.1 stand-in for the YouTube upload and OAuth endpoints.
//!
//! Routes:
//! - `POST /upload/youtube/v3/videos` starts a session (`Location: <base>session/1`).
//! - `PUT /session/1` accepts `Content-Range` chunks; `bytes */N` reports progress.
//! - `POST /upload/youtube/v3/captions` returns a caption resource.
//! - `POST /token` returns an access token.
//!
//! Each chunk PUT pops the next scripted entry: `Some(status)` fails that chunk
//! (committing nothing), `None` accepts it. Once the script is empty every
//! chunk is accepted.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct State {
    requests: Vec<RecordedRequest>,
    script: VecDeque<Option<u32>>,
    /// Bytes committed in the current session.
    received: Vec<u8>,
    /// When false the terminal chunk response carries no `id`.
    return_id: bool,
}

#[derive(Clone)]
pub struct ApiServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl ApiServer {
    /// Root URL with a trailing slash, e.g. `http://127.0.0.1:12345/`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn upload_base(&self) -> String {
        format!("{}upload/youtube/v3", self.base)
    }

    pub fn token_uri(&self) -> String {
        format!("{}token", self.base)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Bytes the fake session has committed so far.
    pub fn received(&self) -> Vec<u8> {
        self.state.lock().unwrap().received.clone()
    }
}

/// Starts the server; the given statuses are returned, in order, for the
/// first chunk PUTs.
pub fn start(failures: &[u32]) -> ApiServer {
    let script: Vec<Option<u32>> = failures.iter().copied().map(Some).collect();
    start_scripted(&script, true)
}

/// Like `start` but the terminal response carries no video id.
pub fn start_without_id() -> ApiServer {
    start_scripted(&[], false)
}

pub fn start_scripted(script: &[Option<u32>], return_id: bool) -> ApiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base = format!("http://127.0.0.1:{}/", port);
    let state = Arc::new(Mutex::new(State {
        script: script.iter().copied().collect(),
        return_id,
        ..State::default()
    }));
    let server = ApiServer {
        base: base.clone(),
        state: Arc::clone(&state),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&state);
            let base = base.clone();
            thread::spawn(move || handle(stream, &base, &state));
        }
    });
    server
}

fn handle(mut stream: TcpStream, base: &str, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let response = route(&request, base, state);
    state.lock().unwrap().requests.push(request);
    let _ = stream.write_all(&response);
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buf = [0u8; 16 * 1024];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn route(req: &RecordedRequest, base: &str, state: &Mutex<State>) -> Vec<u8> {
    let path = req.path.split('?').next().unwrap_or("");
    match (req.method.as_str(), path) {
        ("POST", "/upload/youtube/v3/videos") => {
            state.lock().unwrap().received.clear();
            respond(200, &[format!("Location: {}session/1", base)], b"")
        }
        ("PUT", "/session/1") => session_put(req, state),
        ("POST", "/upload/youtube/v3/captions") => {
            let body = br#"{"kind":"youtube#caption","id":"cap-1","snippet":{"videoId":"vid-1","language":"en","name":"EN","isDraft":false}}"#;
            respond(200, &["Content-Type: application/json".to_string()], body)
        }
        ("POST", "/token") => {
            let body = br#"{"access_token":"fresh-token","expires_in":3600,"token_type":"Bearer"}"#;
            respond(200, &["Content-Type: application/json".to_string()], body)
        }
        _ => respond(404, &[], b"not found"),
    }
}

fn session_put(req: &RecordedRequest, state: &Mutex<State>) -> Vec<u8> {
    let content_range = req.header("Content-Range").unwrap_or("").to_string();
    let ranges = content_range.trim_start_matches("bytes ").to_string();
    let (range, total) = match ranges.split_once('/') {
        Some((r, t)) => (r.to_string(), t.parse::<usize>().unwrap_or(0)),
        None => return respond(400, &[], b"bad Content-Range"),
    };

    let mut st = state.lock().unwrap();
    if range != "*" {
        if let Some(Some(status)) = st.script.pop_front() {
            return respond(status, &[], b"{\"error\":{\"message\":\"backend error\"}}");
        }
        let start = range
            .split_once('-')
            .and_then(|(a, _)| a.parse::<usize>().ok())
            .unwrap_or(0);
        st.received.truncate(start);
        st.received.extend_from_slice(&req.body);
    }

    if total > 0 && st.received.len() >= total {
        let body = if st.return_id {
            br#"{"kind":"youtube#video","id":"vid-1","status":{"uploadStatus":"uploaded"}}"#.to_vec()
        } else {
            br#"{"kind":"youtube#video"}"#.to_vec()
        };
        return respond(200, &["Content-Type: application/json".to_string()], &body);
    }
    let headers = if st.received.is_empty() {
        Vec::new()
    } else {
        vec![format!("Range: bytes=0-{}", st.received.len() - 1)]
    };
    respond(308, &headers, b"")
}

fn respond(status: u32, headers: &[String], body: &[u8]) -> Vec<u8> {
    let reason = match status {
        200 => "OK",
        308 => "Resume Incomplete",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let mut out = format!("HTTP/1.1 {} {}\r\n", status, reason);
    for h in headers {
        out.push_str(h);
        out.push_str("\r\n");
    }
    out.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()));
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

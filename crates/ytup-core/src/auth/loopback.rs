//! One-shot loopback listener that captures the OAuth redirect.

use super::AuthError;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);
const DONE_PAGE: &str = "<html><body>The authentication flow has completed. \
                         You may close this window.</body></html>";

/// Listens on `127.0.0.1:<free port>` until the browser is redirected back.
#[derive(Debug)]
pub struct LoopbackReceiver {
    listener: TcpListener,
}

impl LoopbackReceiver {
    pub fn bind() -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    /// Redirect URI to register in the authorization request.
    pub fn redirect_uri(&self) -> io::Result<String> {
        Ok(format!("http://127.0.0.1:{}/", self.listener.local_addr()?.port()))
    }

    /// Waits for a request whose query carries `code` or `error` and returns
    /// its target (path and query). Anything else (favicon, speculative
    /// connections) gets a 404 and the wait continues.
    pub fn wait_for_redirect(&self, timeout: Duration) -> Result<String, AuthError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    if let Some(target) = answer(stream) {
                        tracing::debug!("received authorization redirect");
                        return Ok(target);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(AuthError::RedirectTimeout);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(AuthError::Loopback(e)),
            }
        }
    }
}

/// Reads the request line, replies, and returns the target if it is the redirect.
fn answer(mut stream: TcpStream) -> Option<String> {
    // Accepted sockets can inherit the listener's non-blocking mode.
    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT)).ok()?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let target = request_line.split_whitespace().nth(1)?.to_string();
    // Consume the headers so closing the socket does not reset it.
    let mut header = String::new();
    while reader.read_line(&mut header).ok()? > 2 {
        header.clear();
    }

    let is_redirect = target.contains("code=") || target.contains("error=");
    let (status, body) = if is_redirect {
        ("200 OK", DONE_PAGE)
    } else {
        ("404 Not Found", "")
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    is_redirect.then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn get(uri: &str, target: &str) -> String {
        let addr = uri.trim_start_matches("http://").trim_end_matches('/');
        let mut s = TcpStream::connect(addr).unwrap();
        write!(s, "GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", target, addr).unwrap();
        let mut out = String::new();
        s.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn captures_redirect_after_unrelated_requests() {
        let rx = LoopbackReceiver::bind().unwrap();
        let uri = rx.redirect_uri().unwrap();
        assert!(uri.starts_with("http://127.0.0.1:"));

        let client = thread::spawn(move || {
            let favicon = get(&uri, "/favicon.ico");
            let done = get(&uri, "/?state=s1&code=4%2Fabc");
            (favicon, done)
        });
        let target = rx.wait_for_redirect(Duration::from_secs(10)).unwrap();
        assert_eq!(target, "/?state=s1&code=4%2Fabc");

        let (favicon, done) = client.join().unwrap();
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(done.starts_with("HTTP/1.1 200"));
        assert!(done.contains("You may close this window"));
    }

    #[test]
    fn gives_up_after_timeout() {
        let rx = LoopbackReceiver::bind().unwrap();
        assert!(matches!(
            rx.wait_for_redirect(Duration::from_millis(150)),
            Err(AuthError::RedirectTimeout)
        ));
    }
}

//! Minimal HTTP/1.1 server serving several media files for integration tests.
//!
//! Each path has its own body and switches: HEAD refusal, and a per-chunk
//! delay to make transfers slow enough to cancel. Unknown paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const CHUNK: usize = 1024;

#[derive(Debug, Clone)]
pub struct Route {
    pub body: Vec<u8>,
    /// If false, HEAD returns 405 (size probe fails, GET still works).
    pub head_allowed: bool,
    /// Sleep between 1 KiB body chunks.
    pub chunk_delay: Option<Duration>,
}

impl Route {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            head_allowed: true,
            chunk_delay: None,
        }
    }

    pub fn no_head(mut self) -> Self {
        self.head_allowed = false;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }
}

pub struct MediaServer {
    base: String,
    gets: Arc<AtomicUsize>,
    heads: Arc<AtomicUsize>,
}

impl MediaServer {
    /// URL for `path` (e.g. `"/stream/a"`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of GET requests received so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of HEAD requests received so far.
    pub fn heads(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }
}

/// Deterministic body of `len` bytes, distinct per `seed`.
pub fn body(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> MediaServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let gets = Arc::new(AtomicUsize::new(0));
    let heads = Arc::new(AtomicUsize::new(0));
    {
        let gets = Arc::clone(&gets);
        let heads = Arc::clone(&heads);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let gets = Arc::clone(&gets);
                let heads = Arc::clone(&heads);
                thread::spawn(move || handle(stream, &routes, &gets, &heads));
            }
        });
    }
    MediaServer {
        base: format!("http://127.0.0.1:{}", port),
        gets,
        heads,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    gets: &AtomicUsize,
    heads: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    let Some(route) = routes.get(path) else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );
        return;
    };

    if method.eq_ignore_ascii_case("HEAD") {
        heads.fetch_add(1, Ordering::SeqCst);
        if !route.head_allowed {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            route.body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        gets.fetch_add(1, Ordering::SeqCst);
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            route.body.len()
        );
        if stream.write_all(header.as_bytes()).is_err() {
            return;
        }
        for chunk in route.body.chunks(CHUNK) {
            if let Some(delay) = route.chunk_delay {
                thread::sleep(delay);
            }
            if stream.write_all(chunk).is_err() {
                // Client aborted.
                return;
            }
            let _ = stream.flush();
        }
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
}

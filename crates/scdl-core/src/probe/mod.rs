//! HTTP HEAD size probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers only and read
//! `Content-Length` ahead of the real transfer.

mod parse;

use anyhow::{Context, Result};
use std::str;

use crate::control::Cancelled;
use crate::transport::Transport;

/// Result of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
}

/// Performs a HEAD request through `transport` and returns parsed metadata.
///
/// Holds one connection slot for the duration of the request. Fails with
/// [`Cancelled`] if `cancel` fires while waiting for a slot.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn probe(transport: &Transport, url: &str, cancel: &dyn Fn() -> bool) -> Result<HeadResult> {
    let _slot = transport
        .budget()
        .acquire(cancel)
        .ok_or_else(|| anyhow::anyhow!(Cancelled))?;

    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.nobody(true)?; // HEAD request
    transport.options().apply(&mut easy)?;
    easy.timeout(transport.options().probe_timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // Each redirect hop starts a new header block; keep only the last one.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }

    Ok(parse::parse_headers(&headers))
}

/// Size of the resource at `url`, or an error if it cannot be determined.
pub fn probe_size(transport: &Transport, url: &str, cancel: &dyn Fn() -> bool) -> Result<u64> {
    let head = probe(transport, url, cancel)?;
    head.content_length
        .ok_or_else(|| anyhow::anyhow!("HEAD {} has no Content-Length", url))
}

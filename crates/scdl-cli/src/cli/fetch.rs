//! Page retrieval over curl for track collection.

use anyhow::{bail, Context, Result};
use scdl_core::{PageFetcher, TransportOptions};
use url::Url;

/// Fetches page markup with a plain GET, following redirects.
pub struct CurlPageFetcher {
    options: TransportOptions,
}

impl CurlPageFetcher {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

impl PageFetcher for CurlPageFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let url = validate_page_url(url)?;
        let opts = &self.options;

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.low_speed_limit(opts.low_speed_limit)?;
        easy.low_speed_time(opts.low_speed_time)?;
        if let Some(ua) = &opts.user_agent {
            easy.useragent(ua)?;
        }
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("GET {} failed", url))?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            bail!("GET {} returned HTTP {}", url, code);
        }
        tracing::debug!(url = %url, bytes = body.len(), "page fetched");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_page_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported URL scheme {:?}: {}", other, raw),
    }
}

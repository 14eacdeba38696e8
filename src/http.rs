//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just raw byte downloads (diagnosis images) with the
//! fixed user-agent and optional session cookie. One shot per call, no
//! retries.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// Download timeout for raw byte fetches.
pub const DOWNLOAD_TIMEOUT_MS: u64 = 20_000;

/// HTTP client for raw downloads.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    cookie: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with the site user-agent and an
    /// optional session cookie.
    pub fn new(timeout_ms: u64, cookie: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(crate::fetch::USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            cookie: cookie.map(str::to_string),
        }
    }

    /// Download the raw bytes at `url`, following redirects.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header("cookie", cookie);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("download failed: {url}"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("download body failed: {url}"))?;

        debug!(%url, size = bytes.len(), "downloaded bytes");

        Ok(bytes.to_vec())
    }
}

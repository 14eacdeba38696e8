//! Top-level diagnosis client.
//!
//! Ties the pipeline together: mirror probe, page fetch, extraction,
//! then rendering. Each operation is a single linear pass with no
//! retries and no state carried between calls.

use crate::config::ShindanConfig;
use crate::error::ShindanError;
use crate::http::{HttpClient, DOWNLOAD_TIMEOUT_MS};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::{extract, fetch, mirror, render};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How a diagnosis result is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Rasterize the result to a PNG screenshot.
    Image,
    /// Return the visible result text.
    Text,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Image
    }
}

/// A rendered diagnosis. Ownership transfers to the caller; nothing is
/// cached.
#[derive(Debug, Clone)]
pub enum ShindanOutput {
    Text(String),
    Image(Vec<u8>),
}

/// A configured diagnosis entry as listed by the chat layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShindanEntry {
    /// Diagnosis id on shindanmaker.com.
    pub id: u32,
    /// Chat command bound to this diagnosis.
    pub command: String,
    /// Display title.
    pub title: String,
    /// Output mode for this diagnosis.
    #[serde(default)]
    pub mode: OutputMode,
}

/// Per-day seed appended to the input name so results vary daily, and
/// stripped again from every output.
pub fn daily_seed() -> String {
    chrono::Local::now().format("%y%m%d").to_string()
}

/// Diagnosis client. One browser engine shared across operations; every
/// operation acquires and releases its own page.
pub struct ShindanClient {
    renderer: Arc<dyn Renderer>,
    http: HttpClient,
    config: ShindanConfig,
}

impl ShindanClient {
    /// Launch a headless Chromium instance and build a client on it.
    pub async fn launch(config: ShindanConfig) -> Result<Self, ShindanError> {
        let renderer = ChromiumRenderer::new(config.chrome_path.as_deref()).await?;
        Ok(Self::with_renderer(config, Arc::new(renderer)))
    }

    /// Build a client on an existing renderer.
    pub fn with_renderer(config: ShindanConfig, renderer: Arc<dyn Renderer>) -> Self {
        let http = HttpClient::new(DOWNLOAD_TIMEOUT_MS, config.cookie.as_deref());
        Self {
            renderer,
            http,
            config,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        fetch::request_headers(self.config.cookie.as_deref())
    }

    /// Probe the mirrors and return the fastest live base URL, or fail
    /// with the user-facing unreachable error. No navigation beyond the
    /// probe happens when every mirror is down.
    async fn live_base_url(&self) -> Result<String, ShindanError> {
        let timeout = Duration::from_secs(self.config.probe_timeout_secs);
        match mirror::probe_mirrors(self.renderer.as_ref(), &self.headers(), timeout).await? {
            Some(base) => {
                info!(%base, "selected mirror");
                Ok(base)
            }
            None => Err(ShindanError::AllMirrorsDown),
        }
    }

    async fn capture(
        &self,
        html: &str,
        width: u32,
        height: u32,
        settle_ms: u64,
    ) -> Result<Vec<u8>> {
        let ctx = self.renderer.new_context().await?;
        let png = ctx.capture_html(html, width, height, settle_ms).await;
        ctx.close().await?;
        png
    }

    /// Read the title of a diagnosis.
    pub async fn get_title(&self, id: u32) -> Result<String, ShindanError> {
        let base = self.live_base_url().await?;
        Ok(fetch::fetch_title(
            self.renderer.as_ref(),
            &self.headers(),
            &base,
            id,
            self.config.navigation_timeout_ms,
        )
        .await?)
    }

    /// Run a diagnosis end to end and render it in the requested mode.
    pub async fn run_diagnosis(
        &self,
        id: u32,
        name: &str,
        mode: OutputMode,
    ) -> Result<ShindanOutput, ShindanError> {
        let base = self.live_base_url().await?;
        let seed = daily_seed();
        let markup = fetch::submit_diagnosis(
            self.renderer.as_ref(),
            &self.headers(),
            &base,
            id,
            &format!("{name}{seed}"),
            self.config.navigation_timeout_ms,
        )
        .await?;

        match mode {
            OutputMode::Text => Ok(ShindanOutput::Text(extract::extract_plain_text(
                &markup, &seed,
            )?)),
            OutputMode::Image => {
                let result = extract::extract_result(&markup)?;
                let html = render::render_diagnosis_html(&result, &seed)?;
                let settle_ms = if result.has_chart {
                    render::CHART_SETTLE_MS
                } else {
                    0
                };
                let (width, height) = render::RESULT_VIEWPORT;
                let png = self.capture(&html, width, height, settle_ms).await?;
                Ok(ShindanOutput::Image(png))
            }
        }
    }

    /// Render the static listing of configured diagnoses to an image.
    pub async fn render_list(&self, entries: &[ShindanEntry]) -> Result<Vec<u8>, ShindanError> {
        let html = render::render_list_html(entries)?;
        let (width, height) = render::LIST_VIEWPORT;
        Ok(self.capture(&html, width, height, 0).await?)
    }

    /// Download raw image bytes (e.g. a result image referenced by the
    /// extracted markup).
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, ShindanError> {
        Ok(self.http.get_bytes(url).await?)
    }

    /// Shut down the underlying browser engine.
    pub async fn shutdown(&self) -> Result<(), ShindanError> {
        Ok(self.renderer.shutdown().await?)
    }
}

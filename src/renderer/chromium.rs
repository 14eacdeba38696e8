//! Chromium-based renderer using chromiumoxide.

use super::{RenderContext, Renderer};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, SetDocumentContentParams,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SHINDAN_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SHINDAN_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a new ChromiumRenderer, launching a headless Chromium instance.
    ///
    /// `chrome_path` overrides binary auto-detection when set.
    pub async fn new(chrome_path: Option<&std::path::Path>) -> Result<Self> {
        let chrome_path = match chrome_path {
            Some(p) => p.to_path_buf(),
            None => find_chromium()
                .context("Chromium not found. Install Chrome or set SHINDAN_CHROMIUM_PATH.")?,
        };

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--hide-scrollbars")
            .arg("--mute-audio")
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn set_extra_headers(&self, headers: &[(String, String)]) -> Result<()> {
        let map: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        let params = SetExtraHttpHeadersParams::builder()
            .headers(Headers::new(serde_json::Value::Object(map)))
            .build()
            .map_err(|e| anyhow!("invalid extra headers: {e}"))?;
        self.page
            .execute(params)
            .await
            .context("failed to set extra headers")?;
        Ok(())
    }

    async fn navigate_commit(&mut self, url: &str, timeout_ms: u64) -> Result<Duration> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            // Navigation committed; full load is deliberately not awaited.
            Ok(Ok(_page)) => Ok(start.elapsed()),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("input element `{selector}` not found"))?;

        // Click to focus, then type
        element
            .click()
            .await
            .with_context(|| format!("failed to focus `{selector}`"))?;
        element
            .type_str(value)
            .await
            .with_context(|| format!("failed to type into `{selector}`"))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("element `{selector}` not found"))?;
        element
            .click()
            .await
            .with_context(|| format!("click on `{selector}` failed"))?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        self.page
            .wait_for_navigation()
            .await
            .context("navigation did not settle")?;
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("element `{selector}` not found"))?;
        let text = element
            .inner_text()
            .await
            .with_context(|| format!("failed to read text of `{selector}`"))?;
        Ok(text.unwrap_or_default())
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn capture_html(
        &self,
        html: &str,
        width: u32,
        height: u32,
        settle_ms: u64,
    ) -> Result<Vec<u8>> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(width),
                i64::from(height),
                1.0,
                false,
            ))
            .await
            .context("failed to override viewport")?;

        let frame_id = self
            .page
            .mainframe()
            .await
            .context("failed to resolve main frame")?
            .context("page has no main frame")?;
        self.page
            .execute(SetDocumentContentParams::new(frame_id, html.to_string()))
            .await
            .context("failed to set document content")?;

        if settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(settle_ms)).await;
        }

        let png = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .context("failed to capture screenshot")?;

        debug!(size = png.len(), width, height, "captured rendered markup");

        Ok(png)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}

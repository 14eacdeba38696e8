//! Fetch diagnosis pages through a scoped browser context.
//!
//! Every operation acquires a fresh page from the renderer, does its
//! work, and releases the page. Failures propagate immediately, there
//! are no retries. Callers must already hold a live base URL from the
//! mirror probe.

use crate::renderer::{RenderContext, Renderer};
use anyhow::Result;
use tracing::debug;

/// User-agent sent with every navigation and download. Part of the
/// implicit compatibility contract with the target site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/96.0.4664.110 Safari/537.36";

/// Title heading on a diagnosis page.
pub const TITLE_SELECTOR: &str = "h1#shindanTitle";

/// Name input on a diagnosis page.
pub const NAME_INPUT_SELECTOR: &str = "#user_input_value_1";

/// Submit button on a diagnosis page.
pub const SUBMIT_SELECTOR: &str = "#shindanButtonSubmit";

/// Request headers for a navigation: fixed user-agent plus the optional
/// session cookie from configuration.
pub fn request_headers(cookie: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("user-agent".to_string(), USER_AGENT.to_string())];
    if let Some(cookie) = cookie {
        headers.push(("cookie".to_string(), cookie.to_string()));
    }
    headers
}

/// URL of the diagnosis page for an id.
pub fn diagnosis_url(base: &str, id: u32) -> String {
    format!("{base}/{id}")
}

/// Read the title of a diagnosis.
pub async fn fetch_title(
    renderer: &dyn Renderer,
    headers: &[(String, String)],
    base: &str,
    id: u32,
    timeout_ms: u64,
) -> Result<String> {
    let mut ctx = renderer.new_context().await?;
    let title = title_on_page(ctx.as_mut(), headers, base, id, timeout_ms).await;
    ctx.close().await?;
    title
}

async fn title_on_page(
    ctx: &mut dyn RenderContext,
    headers: &[(String, String)],
    base: &str,
    id: u32,
    timeout_ms: u64,
) -> Result<String> {
    ctx.set_extra_headers(headers).await?;
    ctx.navigate_commit(&diagnosis_url(base, id), timeout_ms).await?;
    ctx.inner_text(TITLE_SELECTOR).await
}

/// Submit a diagnosis and capture the resulting page's full markup.
///
/// `input` is the user name with the per-day seed already appended.
pub async fn submit_diagnosis(
    renderer: &dyn Renderer,
    headers: &[(String, String)],
    base: &str,
    id: u32,
    input: &str,
    timeout_ms: u64,
) -> Result<String> {
    let mut ctx = renderer.new_context().await?;
    let markup = diagnosis_markup_on_page(ctx.as_mut(), headers, base, id, input, timeout_ms).await;
    ctx.close().await?;
    markup
}

async fn diagnosis_markup_on_page(
    ctx: &mut dyn RenderContext,
    headers: &[(String, String)],
    base: &str,
    id: u32,
    input: &str,
    timeout_ms: u64,
) -> Result<String> {
    let url = diagnosis_url(base, id);
    debug!(%url, "submitting diagnosis");

    ctx.set_extra_headers(headers).await?;
    ctx.navigate_commit(&url, timeout_ms).await?;
    ctx.fill(NAME_INPUT_SELECTOR, input).await?;
    ctx.click(SUBMIT_SELECTOR).await?;
    ctx.wait_for_navigation().await?;
    ctx.get_html().await
}

//! Mirror availability probe.
//!
//! shindanmaker.com is served from several regional mirrors. The probe
//! walks them in sequence within a single scoped browser page, times the
//! navigation commit of each, and picks the fastest reachable one. Worst
//! case total latency is therefore the sum of per-candidate timeouts,
//! not the max.

use crate::renderer::{RenderContext, Renderer};
use anyhow::Result;
use std::time::Duration;
use tracing::debug;

/// Regional mirror prefixes, probed in this order.
pub const MIRROR_PREFIXES: [&str; 5] = ["", "cn.", "en.", "kr.", "jp."];

/// The host every mirror prefix is applied to.
pub const SHINDAN_HOST: &str = "shindanmaker.com";

/// Base URL for a mirror prefix.
pub fn mirror_base_url(prefix: &str) -> String {
    format!("https://{prefix}{SHINDAN_HOST}")
}

/// One probed mirror. `latency: None` means timeout or navigation error;
/// such candidates are excluded from selection.
#[derive(Debug, Clone)]
pub struct MirrorCandidate {
    pub prefix: &'static str,
    pub latency: Option<Duration>,
}

/// Select the reachable candidate with minimal measured latency.
pub fn select_fastest(candidates: &[MirrorCandidate]) -> Option<&'static str> {
    candidates
        .iter()
        .filter_map(|c| c.latency.map(|latency| (c.prefix, latency)))
        .min_by_key(|&(_, latency)| latency)
        .map(|(prefix, _)| prefix)
}

/// Probe all mirrors and return the fastest reachable base URL.
///
/// Opens exactly one browser page for the whole probe sequence and
/// closes it afterwards. Returns `None` when every mirror is down; the
/// caller maps that to [`ShindanError::AllMirrorsDown`](crate::ShindanError)
/// and must not attempt any further navigation.
pub async fn probe_mirrors(
    renderer: &dyn Renderer,
    headers: &[(String, String)],
    timeout: Duration,
) -> Result<Option<String>> {
    let mut ctx = renderer.new_context().await?;
    let candidates = candidates_on_page(ctx.as_mut(), headers, timeout).await;
    ctx.close().await?;
    Ok(select_fastest(&candidates?).map(mirror_base_url))
}

async fn candidates_on_page(
    ctx: &mut dyn RenderContext,
    headers: &[(String, String)],
    timeout: Duration,
) -> Result<Vec<MirrorCandidate>> {
    ctx.set_extra_headers(headers).await?;

    let mut candidates = Vec::with_capacity(MIRROR_PREFIXES.len());
    for prefix in MIRROR_PREFIXES {
        let url = mirror_base_url(prefix);
        let latency = match ctx
            .navigate_commit(&url, timeout.as_millis() as u64)
            .await
        {
            Ok(elapsed) => {
                debug!(mirror = %url, elapsed_ms = elapsed.as_millis() as u64, "mirror reachable");
                Some(elapsed)
            }
            Err(e) => {
                debug!(mirror = %url, "mirror unreachable: {e}");
                None
            }
        };
        candidates.push(MirrorCandidate { prefix, latency });
    }

    Ok(candidates)
}

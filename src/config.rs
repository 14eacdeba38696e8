//! Client configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Default per-mirror probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Default navigation timeout for diagnosis pages in milliseconds.
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Configuration for [`ShindanClient`](crate::client::ShindanClient).
///
/// The cookie is an optional shindanmaker.com session cookie, injected
/// into every browser navigation and HTTP download alongside the fixed
/// user-agent. It is modeled here as explicit configuration rather than
/// a conditional mutation of shared headers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShindanConfig {
    /// Optional session cookie sent with every request.
    pub cookie: Option<String>,
    /// Path to a Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<PathBuf>,
    /// Per-mirror probe timeout in seconds.
    pub probe_timeout_secs: u64,
    /// Navigation timeout for diagnosis pages in milliseconds.
    pub navigation_timeout_ms: u64,
}

impl Default for ShindanConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            chrome_path: None,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}

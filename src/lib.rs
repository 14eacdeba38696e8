//! ShindanMaker diagnosis client.
//!
//! Drives a headless Chromium instance to submit a name to a
//! shindanmaker.com diagnosis, extracts the result fragment from the
//! response markup, and renders it either as plain text or as a PNG
//! screenshot for display in a chat interface.
//!
//! Pipeline per invocation: mirror probe, page fetch, extraction,
//! rendering. One request/response cycle, no queuing, no retries, no
//! persistent state.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod mirror;
pub mod render;
pub mod renderer;

pub use client::{daily_seed, OutputMode, ShindanClient, ShindanEntry, ShindanOutput};
pub use config::ShindanConfig;
pub use error::ShindanError;
pub use extract::DiagnosisResult;

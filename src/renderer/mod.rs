//! Renderer abstraction for browser-based page driving.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). A context
//! is a single page, exclusively acquired and released per operation so
//! concurrent invocations never interleave on the same page.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Attach extra HTTP headers to every request this context makes.
    async fn set_extra_headers(&self, headers: &[(String, String)]) -> Result<()>;
    /// Navigate to a URL, returning once the navigation is committed
    /// (not fully loaded). Returns the elapsed wall-clock time.
    async fn navigate_commit(&mut self, url: &str, timeout_ms: u64) -> Result<Duration>;
    /// Focus the element matching `selector` and type `value` into it.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;
    /// Click the element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;
    /// Wait for the next navigation to settle.
    async fn wait_for_navigation(&self) -> Result<()>;
    /// Inner text of the element matching `selector`.
    async fn inner_text(&self, selector: &str) -> Result<String>;
    /// Full page markup.
    async fn get_html(&self) -> Result<String>;
    /// Replace the page content with `html` at the given viewport, wait
    /// `settle_ms` for client-side rendering, and screenshot to PNG.
    async fn capture_html(
        &self,
        html: &str,
        width: u32,
        height: u32,
        settle_ms: u64,
    ) -> Result<Vec<u8>>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory renderer for unit tests. Navigation outcomes,
    //! page markup, and element text are all preset; interactions are
    //! recorded for assertions.

    use super::{RenderContext, Renderer};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Shared state inspected by tests after the run.
    #[derive(Default)]
    pub struct ScriptedState {
        /// url -> simulated commit latency in ms; absent or None = failure.
        pub routes: HashMap<String, Option<u64>>,
        /// Markup returned by `get_html`.
        pub html: String,
        /// Text returned by `inner_text`.
        pub title: String,
        /// When set, `set_extra_headers` fails.
        pub fail_headers: bool,
        pub navigations: Mutex<Vec<String>>,
        pub filled: Mutex<Vec<(String, String)>>,
        pub clicked: Mutex<Vec<String>>,
        /// (html, width, height, settle_ms) per `capture_html` call.
        pub captures: Mutex<Vec<(String, u32, u32, u64)>>,
    }

    pub struct ScriptedRenderer {
        state: Arc<ScriptedState>,
        created: AtomicUsize,
        active: Arc<AtomicUsize>,
    }

    impl ScriptedRenderer {
        pub fn new(routes: Vec<(&str, Option<u64>)>) -> Self {
            let state = ScriptedState {
                routes: routes
                    .into_iter()
                    .map(|(url, latency)| (url.to_string(), latency))
                    .collect(),
                ..Default::default()
            };
            Self {
                state: Arc::new(state),
                created: AtomicUsize::new(0),
                active: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_html(mut self, html: &str) -> Self {
            Arc::get_mut(&mut self.state).unwrap().html = html.to_string();
            self
        }

        pub fn with_title(mut self, title: &str) -> Self {
            Arc::get_mut(&mut self.state).unwrap().title = title.to_string();
            self
        }

        pub fn with_failing_headers(mut self) -> Self {
            Arc::get_mut(&mut self.state).unwrap().fail_headers = true;
            self
        }

        pub fn state(&self) -> &ScriptedState {
            &self.state
        }

        pub fn contexts_created(&self) -> usize {
            self.created.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
            self.created.fetch_add(1, Ordering::Relaxed);
            self.active.fetch_add(1, Ordering::Relaxed);
            Ok(Box::new(ScriptedContext {
                state: Arc::clone(&self.state),
                active: Arc::clone(&self.active),
            }))
        }

        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }

        fn active_contexts(&self) -> usize {
            self.active.load(Ordering::Relaxed)
        }
    }

    pub struct ScriptedContext {
        state: Arc<ScriptedState>,
        active: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderContext for ScriptedContext {
        async fn set_extra_headers(&self, _headers: &[(String, String)]) -> Result<()> {
            if self.state.fail_headers {
                bail!("header injection failed");
            }
            Ok(())
        }

        async fn navigate_commit(&mut self, url: &str, _timeout_ms: u64) -> Result<Duration> {
            self.state.navigations.lock().unwrap().push(url.to_string());
            match self.state.routes.get(url) {
                Some(Some(latency_ms)) => Ok(Duration::from_millis(*latency_ms)),
                _ => bail!("navigation failed: {url}"),
            }
        }

        async fn fill(&self, selector: &str, value: &str) -> Result<()> {
            self.state
                .filled
                .lock()
                .unwrap()
                .push((selector.to_string(), value.to_string()));
            Ok(())
        }

        async fn click(&self, selector: &str) -> Result<()> {
            self.state.clicked.lock().unwrap().push(selector.to_string());
            Ok(())
        }

        async fn wait_for_navigation(&self) -> Result<()> {
            Ok(())
        }

        async fn inner_text(&self, _selector: &str) -> Result<String> {
            Ok(self.state.title.clone())
        }

        async fn get_html(&self) -> Result<String> {
            Ok(self.state.html.clone())
        }

        async fn capture_html(
            &self,
            html: &str,
            width: u32,
            height: u32,
            settle_ms: u64,
        ) -> Result<Vec<u8>> {
            self.state
                .captures
                .lock()
                .unwrap()
                .push((html.to_string(), width, height, settle_ms));
            Ok(b"\x89PNG\r\n\x1a\n".to_vec())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.active.fetch_sub(1, Ordering::Relaxed);
            Ok(())
        }
    }
}

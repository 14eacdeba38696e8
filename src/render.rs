//! Render extracted fragments to final output.
//!
//! Image mode feeds the fragments into a compile-time askama template
//! and rasterizes the result through a browser context at a fixed small
//! viewport. Text mode never touches a template. Templates are
//! compiled in, so there is no process-wide template environment to
//! initialize or tear down.

use crate::client::ShindanEntry;
use crate::extract::DiagnosisResult;
use anyhow::{Context, Result};
use askama::Template;

/// Viewport for rasterizing a diagnosis result.
pub const RESULT_VIEWPORT: (u32, u32) = (750, 100);

/// Viewport for rasterizing the diagnosis listing.
pub const LIST_VIEWPORT: (u32, u32) = (100, 100);

/// Extra settle time when the result embeds a chart.js chart, which
/// renders asynchronously client-side.
pub const CHART_SETTLE_MS: u64 = 2000;

#[derive(Template)]
#[template(path = "shindan.html", escape = "none")]
struct ShindanTemplate<'a> {
    title: &'a str,
    result: &'a str,
    result_js: &'a str,
    has_chart: bool,
}

#[derive(Template)]
#[template(path = "shindan_list.html", escape = "none")]
struct ShindanListTemplate<'a> {
    entries: &'a [ShindanEntry],
}

/// Render the diagnosis template and strip the per-day seed from the
/// produced markup.
pub fn render_diagnosis_html(result: &DiagnosisResult, seed: &str) -> Result<String> {
    let html = ShindanTemplate {
        title: &result.title,
        result: &result.result,
        result_js: &result.result_js,
        has_chart: result.has_chart,
    }
    .render()
    .context("failed to render diagnosis template")?;
    Ok(html.replace(seed, ""))
}

/// Render the static listing of configured diagnoses.
pub fn render_list_html(entries: &[ShindanEntry]) -> Result<String> {
    ShindanListTemplate { entries }
        .render()
        .context("failed to render list template")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OutputMode;

    fn sample_result(has_chart: bool) -> DiagnosisResult {
        DiagnosisResult {
            title: "<h1 id=\"shindanResultAbove\">Title</h1>".to_string(),
            result: "<div id=\"shindanResultBlock\">Alice240101 is lucky</div>".to_string(),
            result_js: "<script>var savedShindanResult = 1;</script>".to_string(),
            has_chart,
        }
    }

    #[test]
    fn test_diagnosis_html_embeds_fragments() {
        let html = render_diagnosis_html(&sample_result(false), "999999").unwrap();
        assert!(html.contains("shindanResultAbove"));
        assert!(html.contains("shindanResultBlock"));
        assert!(html.contains("savedShindanResult"));
    }

    #[test]
    fn test_chart_script_included_only_when_needed() {
        let with = render_diagnosis_html(&sample_result(true), "999999").unwrap();
        assert!(with.contains("chart.js"));

        let without = render_diagnosis_html(&sample_result(false), "999999").unwrap();
        assert!(!without.contains("chart.js"));
    }

    #[test]
    fn test_seed_stripped_from_rendered_markup() {
        let html = render_diagnosis_html(&sample_result(false), "240101").unwrap();
        assert!(!html.contains("240101"));
        assert!(html.contains("Alice is lucky"));
    }

    #[test]
    fn test_list_template_renders_entries() {
        let entries = vec![
            ShindanEntry {
                id: 1_150_687,
                command: "抽老婆".to_string(),
                title: "今天的老婆是谁".to_string(),
                mode: OutputMode::Image,
            },
            ShindanEntry {
                id: 1_222_992,
                command: "fantasy".to_string(),
                title: "Fantasy Stats".to_string(),
                mode: OutputMode::Text,
            },
        ];
        let html = render_list_html(&entries).unwrap();
        assert!(html.contains("抽老婆"));
        assert!(html.contains("Fantasy Stats"));
    }
}

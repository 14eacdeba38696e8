//! End-to-end extraction and rendering over a realistic result page,
//! without a browser: markup in, renderable HTML out.

use shindan_render::extract::{extract_plain_text, extract_result};
use shindan_render::render::render_diagnosis_html;
use shindan_render::ShindanError;

const SEED: &str = "260826";

fn result_page(seed: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>ShindanMaker</title>
<script>var analytics = {{}};</script>
<script>var savedShindanResult = "Alice{seed} is 80% cat";</script>
<script src="https://cdn.jsdelivr.net/npm/chart.js@3.7.0/dist/chart.min.js"></script>
</head>
<body>
<h1 id="shindanResultAbove">今日の診断</h1>
<div id="shindanResultBlock">
  <span id="shindanResult">
    <span class="shindanEffects" data-mode="ef_shuffle">x9f2<noscript>Alice{seed} is 80% cat</noscript></span>
    <br>
    <img src="https://shindanmaker.com/images/cat.png">
  </span>
  <canvas id="shindanChart"></canvas>
</div>
</body>
</html>"#
    )
}

#[test]
fn diagnosis_page_renders_without_effect_scramble_or_seed() {
    let page = result_page(SEED);
    let result = extract_result(&page).unwrap();

    assert_eq!(result.title, r#"<h1 id="shindanResultAbove">今日の診断</h1>"#);
    assert!(result.has_chart);
    assert!(result.result_js.contains("savedShindanResult"));
    // Shuffle placeholder is gone; the noscript fallback survives.
    assert!(!result.result.contains("x9f2"));
    assert!(result.result.contains(&format!("Alice{SEED} is 80% cat")));
    assert!(!result.result.contains("noscript"));

    let html = render_diagnosis_html(&result, SEED).unwrap();
    assert!(html.contains("Alice is 80% cat"));
    assert!(!html.contains(SEED));
    assert!(html.contains("chart.js"));
}

#[test]
fn text_mode_reads_visible_text_and_image_source() {
    let page = result_page(SEED);
    let text = extract_plain_text(&page, SEED).unwrap();

    assert!(text.contains("Alice is 80% cat"));
    assert!(text.contains("https://shindanmaker.com/images/cat.png"));
    assert!(!text.contains(SEED));
    assert!(!text.contains("<img"));
}

#[test]
fn page_without_result_block_fails_loudly() {
    let err = extract_result("<html><body><p>maintenance</p></body></html>").unwrap_err();
    match err {
        ShindanError::MissingElement(selector) => assert!(selector.contains("shindanResultBlock")),
        other => panic!("unexpected error: {other}"),
    }
}

//! Parse diagnosis result fragments out of raw page markup.
//!
//! Isolates the result container, strips the shuffle/typing animation
//! overlays the site wraps results in, and produces either markup
//! fragments for the image template or plain visible text. All work
//! happens on a parsed copy via the `scraper` crate; the raw markup
//! string is never mutated.

use crate::error::ShindanError;
use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// Marker string identifying the result-data script tag.
pub const RESULT_SCRIPT_MARKER: &str = "savedShindanResult";

/// Substring whose presence anywhere in the raw markup means the result
/// embeds a client-side chart. Cheap heuristic, not a structural check.
pub const CHART_MARKER: &str = "chart.js";

/// Class carried by animation-effect wrapper spans.
const EFFECT_CLASS: &str = "shindanEffects";

/// `data-mode` values of the effect wrappers that get stripped.
const EFFECT_MODES: [&str; 2] = ["ef_shuffle", "ef_typing"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Fragments extracted from a diagnosis result page, consumed
/// immediately by the renderer. Not persisted.
#[derive(Debug, Clone)]
pub struct DiagnosisResult {
    /// Title fragment markup; the literal `"None"` when absent.
    pub title: String,
    /// Cleaned result-container markup.
    pub result: String,
    /// Result-data script markup; the literal `"None"` when the script
    /// tag is absent.
    pub result_js: String,
    /// Whether the result embeds a chart.js chart.
    pub has_chart: bool,
}

/// Extract the renderable fragments from raw result-page markup.
///
/// The result container `div#shindanResultBlock` is mandatory; its
/// absence is a contract violation and fails loudly.
pub fn extract_result(html: &str) -> Result<DiagnosisResult, ShindanError> {
    let dom = Html::parse_document(html);

    let script_sel = Selector::parse("script").unwrap();
    let result_js = dom
        .select(&script_sel)
        .find(|s| s.text().any(|t| t.contains(RESULT_SCRIPT_MARKER)))
        .map(|s| s.html())
        .unwrap_or_else(|| "None".to_string());

    let above_sel = Selector::parse("h1#shindanResultAbove").unwrap();
    let image_container_sel = Selector::parse("div.shindanTitleImageContainer").unwrap();
    let title = dom
        .select(&above_sel)
        .next()
        .or_else(|| dom.select(&image_container_sel).next())
        .map(|el| el.html())
        .unwrap_or_else(|| "None".to_string());

    let block_sel = Selector::parse("div#shindanResultBlock").unwrap();
    let block = dom
        .select(&block_sel)
        .next()
        .ok_or(ShindanError::MissingElement("div#shindanResultBlock"))?;

    let plan = plan_effects(block);
    let mut result = String::new();
    write_node(*block, &dom.tree, &plan, &mut result);

    Ok(DiagnosisResult {
        title,
        result,
        result_js,
        has_chart: html.contains(CHART_MARKER),
    })
}

/// Extract the visible result text for plain-text mode.
///
/// Locates `span#shindanResult` (mandatory), replaces every embedded
/// image with its source URL as literal text, and strips the per-day
/// seed from the output.
pub fn extract_plain_text(html: &str, seed: &str) -> Result<String, ShindanError> {
    let dom = Html::parse_document(html);

    let result_sel = Selector::parse("span#shindanResult").unwrap();
    let result = dom
        .select(&result_sel)
        .next()
        .ok_or(ShindanError::MissingElement("span#shindanResult"))?;

    let mut text = String::new();
    collect_text(*result, &mut text);
    Ok(text.replace(seed, ""))
}

fn is_effect_span(el: &Element) -> bool {
    el.name() == "span"
        && el
            .attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|t| t == EFFECT_CLASS))
        && el
            .attr("data-mode")
            .is_some_and(|m| EFFECT_MODES.contains(&m))
}

/// How the serializer treats effect wrappers and their fallbacks.
#[derive(Debug, Default)]
struct EffectPlan {
    /// Effect span -> noscript fallback nested inside it; the span is
    /// emitted as the fallback's content.
    replace_with: HashMap<NodeId, NodeId>,
    /// Nodes omitted entirely (effect spans whose fallback sits outside
    /// them, or spans with no fallback at all).
    drop: HashSet<NodeId>,
    /// Consumed noscript fallbacks outside their span, emitted as their
    /// content in place.
    unwrap: HashSet<NodeId>,
}

/// Pair each effect span with its nearest following `<noscript>`
/// fallback in document order (descendants included). Each fallback is
/// consumed at most once.
fn plan_effects(block: ElementRef<'_>) -> EffectPlan {
    let nodes: Vec<NodeRef<'_, Node>> = block.descendants().collect();
    let mut plan = EffectPlan::default();
    let mut consumed: HashSet<NodeId> = HashSet::new();

    for (i, node) in nodes.iter().enumerate() {
        let Some(el) = node.value().as_element() else {
            continue;
        };
        if !is_effect_span(el) {
            continue;
        }

        let fallback = nodes[i + 1..].iter().find(|n| {
            n.value()
                .as_element()
                .is_some_and(|e| e.name() == "noscript")
                && !consumed.contains(&n.id())
        });

        match fallback {
            Some(ns) => {
                consumed.insert(ns.id());
                if ns.ancestors().any(|a| a.id() == node.id()) {
                    plan.replace_with.insert(node.id(), ns.id());
                } else {
                    plan.drop.insert(node.id());
                    plan.unwrap.insert(ns.id());
                }
            }
            None => {
                plan.drop.insert(node.id());
            }
        }
    }

    plan
}

/// Serialize a node back to markup, applying the effect plan.
fn write_node(node: NodeRef<'_, Node>, tree: &Tree<Node>, plan: &EffectPlan, out: &mut String) {
    let id = node.id();

    if let Some(fallback_id) = plan.replace_with.get(&id) {
        if let Some(fallback) = tree.get(*fallback_id) {
            write_fallback_content(fallback, tree, plan, out);
        }
        return;
    }
    if plan.drop.contains(&id) {
        return;
    }
    if plan.unwrap.contains(&id) {
        write_fallback_content(node, tree, plan, out);
        return;
    }

    match node.value() {
        Node::Element(el) => {
            out.push('<');
            out.push_str(el.name());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if !VOID_ELEMENTS.contains(&el.name()) {
                for child in node.children() {
                    write_node(child, tree, plan, out);
                }
                out.push_str("</");
                out.push_str(el.name());
                out.push('>');
            }
        }
        Node::Text(text) => escape_text(&text.text, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.comment);
            out.push_str("-->");
        }
        _ => {
            for child in node.children() {
                write_node(child, tree, plan, out);
            }
        }
    }
}

/// Emit the content of a consumed `<noscript>` fallback. With scripting
/// enabled the parser stores noscript children as one raw text node, so
/// text children are written verbatim to keep any markup inside the
/// fallback intact.
fn write_fallback_content(
    fallback: NodeRef<'_, Node>,
    tree: &Tree<Node>,
    plan: &EffectPlan,
    out: &mut String,
) {
    for child in fallback.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            _ => write_node(child, tree, plan, out),
        }
    }
}

/// Collect visible text, substituting images with their source URLs.
fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(el) if el.name() == "img" => {
            if let Some(src) = el.attr("src") {
                out.push_str(src);
            }
        }
        Node::Text(text) => out.push_str(&text.text),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn escape_text(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

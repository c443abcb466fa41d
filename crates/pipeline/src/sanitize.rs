//! Markup sanitizer applied to the captured DOM.
//!
//! Removes `<script>` and `<style>` elements, HTML comments, and any element
//! whose `id` or `class` mentions a known tracking vendor. The element is
//! removed together with its subtree.
//!
//! Input containing an `<html>` tag is treated as a full document and
//! serialized as one; anything else is treated as a body fragment.

use ego_tree::NodeId;
use scraper::{Html, Node};

/// Substrings of `id`/`class` values that mark an element as tracking.
pub const TRACKING_MARKERS: [&str; 4] = ["analytics", "tracking", "gtm", "facebook"];

/// Strip scripts, styles, comments and tracking elements from `html`.
pub fn sanitize_html(html: &str) -> String {
    let is_document = html.to_ascii_lowercase().contains("<html");
    let mut parsed = if is_document {
        Html::parse_document(html)
    } else {
        Html::parse_fragment(html)
    };

    for id in doomed_nodes(&parsed) {
        if let Some(mut node) = parsed.tree.get_mut(id) {
            node.detach();
        }
    }

    if is_document {
        parsed.html()
    } else {
        parsed.root_element().inner_html()
    }
}

/// Nodes to drop, outermost first. Descendants of a dropped node are skipped.
fn doomed_nodes(parsed: &Html) -> Vec<NodeId> {
    let mut doomed = Vec::new();
    let mut stack = vec![parsed.tree.root()];

    while let Some(node) = stack.pop() {
        let drop = match node.value() {
            Node::Comment(_) => true,
            Node::Element(element) => {
                matches!(element.name(), "script" | "style")
                    || is_tracking(element.id())
                    || is_tracking(element.attr("class"))
            }
            _ => false,
        };
        if drop {
            doomed.push(node.id());
        } else {
            stack.extend(node.children());
        }
    }
    doomed
}

fn is_tracking(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        let value = value.to_ascii_lowercase();
        TRACKING_MARKERS.iter().any(|marker| value.contains(marker))
    })
}

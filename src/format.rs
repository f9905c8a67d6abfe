//! Formatting inference: whitespace and quote style for new content,
//! derived from immediate siblings and the parent only. All functions
//! here are read-only and deterministic for a given tree state.

use crate::config::{Config, QuoteStyle};
use crate::dom::document::{Document, DOCUMENT_NODE};
use crate::dom::node::{Attribute, NodeData, NodeId};

/// Whitespace decisions for inserting a child at `index` under `parent`.
pub(crate) struct ChildWhitespace {
    /// `preceding_ws` for the new node.
    pub preceding: String,
    /// New `inner_preceding_ws` for the parent, when its close tag needs
    /// to move to its own line (first child of a previously childless
    /// element).
    pub parent_inner_preceding: Option<String>,
}

/// Indentation rule: reuse the nearest preceding element sibling's
/// whitespace verbatim; else the nearest following one's; else derive
/// from the parent's own indentation plus one unit.
pub(crate) fn infer_child_ws(
    doc: &Document,
    parent: NodeId,
    index: usize,
    config: &Config,
) -> ChildWhitespace {
    let children: Vec<NodeId> = doc.children(parent).collect();
    let index = index.min(children.len());

    let is_element = |id: &&NodeId| doc.node(**id).map(|n| n.is_element()).unwrap_or(false);
    if let Some(&before) = children[..index].iter().rev().find(is_element) {
        if let Some(node) = doc.node(before) {
            return ChildWhitespace {
                preceding: node.preceding_ws().to_string(),
                parent_inner_preceding: None,
            };
        }
    }
    if let Some(&after) = children[index..].iter().find(is_element) {
        if let Some(node) = doc.node(after) {
            return ChildWhitespace {
                preceding: node.preceding_ws().to_string(),
                parent_inner_preceding: None,
            };
        }
    }

    if parent == DOCUMENT_NODE {
        // Top-level nodes sit on their own lines.
        let preceding = if index > 0 {
            config.line_ending.clone()
        } else {
            String::new()
        };
        return ChildWhitespace {
            preceding,
            parent_inner_preceding: None,
        };
    }

    let parent_indent = doc
        .node(parent)
        .map(|n| last_line(n.preceding_ws()).to_string())
        .unwrap_or_default();
    ChildWhitespace {
        preceding: format!("{}{}{}", config.line_ending, parent_indent, config.indent_string),
        parent_inner_preceding: Some(format!("{}{}", config.line_ending, parent_indent)),
    }
}

/// Dominant quote style among existing attributes; ties (including no
/// attributes at all) fall back to the configured default.
pub(crate) fn infer_quote_style(attributes: &[Attribute], config: &Config) -> QuoteStyle {
    let singles = attributes
        .iter()
        .filter(|a| a.quote == QuoteStyle::Single)
        .count();
    let doubles = attributes.len() - singles;
    if singles > doubles {
        QuoteStyle::Single
    } else if doubles > singles {
        QuoteStyle::Double
    } else {
        config.default_quote_style
    }
}

/// Whitespace to put before a new attribute: the element's existing
/// pattern (last attribute's spacing, which catches one-per-line
/// alignment), defaulting to a single space.
pub(crate) fn infer_attribute_ws(attributes: &[Attribute]) -> String {
    match attributes.last() {
        Some(attr) if !attr.preceding_ws.is_empty() => attr.preceding_ws.clone(),
        _ => " ".to_string(),
    }
}

/// The indentation part of a whitespace run: everything after the last
/// line break.
pub(crate) fn last_line(ws: &str) -> &str {
    match ws.rfind(['\n', '\r']) {
        Some(pos) => &ws[pos + 1..],
        None => ws,
    }
}

/// Dominant line terminator of a document: `\r\n` wins over `\n`, which
/// wins over bare `\r`; defaults to `\n` for documents with no breaks.
pub fn detect_line_ending(doc: &Document) -> &'static str {
    let mut saw_lf = false;
    let mut saw_cr = false;
    for id in 0..doc.node_count() as NodeId {
        let Some(node) = doc.node(id) else { continue };
        let spans: [&str; 2] = match &node.data {
            NodeData::Element(el) => [&el.preceding_ws, &el.inner_preceding_ws],
            NodeData::Text(t) => [t.raw.as_deref().unwrap_or(&t.content), ""],
            NodeData::Comment(c) => [&c.preceding_ws, &c.content],
            NodeData::Pi(pi) => [&pi.preceding_ws, ""],
            NodeData::Document { .. } => ["", ""],
        };
        for span in spans {
            if span.contains("\r\n") {
                return "\r\n";
            }
            saw_lf |= span.contains('\n');
            saw_cr |= span.contains('\r');
        }
    }
    if saw_lf {
        "\n"
    } else if saw_cr {
        "\r"
    } else {
        "\n"
    }
}

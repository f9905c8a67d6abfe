//! Modification-aware rendering.
//!
//! Three walks share the tree: preserve (raw spans for unmodified nodes,
//! rebuilt text for modified ones), pretty (uniform re-indentation), and
//! compact (insignificant whitespace dropped). Which one runs is decided
//! by the [`Config`].

use crate::config::Config;
use crate::core::entities;
use crate::dom::document::{Document, DOCUMENT_NODE};
use crate::dom::node::{Attribute, ElementData, NodeData, NodeId};

#[derive(Debug, Default)]
pub struct Serializer {
    config: Config,
}

impl Serializer {
    pub fn new(config: Config) -> Self {
        Serializer { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Render the whole document and mark the tree clean, so a following
    /// preserve-mode render treats the current state as pristine.
    pub fn serialize(&self, doc: &mut Document) -> String {
        let out = self.render(doc);
        doc.clear_modified();
        out
    }

    /// Render the whole document without touching modification flags.
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        if doc.has_bom() && encoding_uses_bom(doc.encoding()) {
            out.push('\u{FEFF}');
        }

        let mut wrote_prolog = false;
        if self.config.include_xml_declaration {
            if let Some(decl) = doc.xml_declaration() {
                out.push_str(decl);
                wrote_prolog = true;
            }
        }
        if let Some(doctype) = doc.doctype() {
            if self.config.pretty_print {
                if wrote_prolog {
                    out.push_str(&self.config.line_ending);
                }
            } else if self.config.whitespace_preservation {
                out.push_str(&doc.doctype_ws);
            }
            out.push_str(doctype);
            wrote_prolog = true;
        }

        if self.config.pretty_print {
            let mut first = true;
            for child in doc.children(DOCUMENT_NODE) {
                if self.skip_for_config(doc, child) {
                    continue;
                }
                if !first || wrote_prolog {
                    out.push_str(&self.config.line_ending);
                }
                first = false;
                self.write_pretty(doc, child, 0, &mut out);
            }
        } else {
            for child in doc.children(DOCUMENT_NODE) {
                if self.skip_for_config(doc, child) {
                    continue;
                }
                self.write_node(doc, child, &mut out);
            }
            if self.config.whitespace_preservation {
                out.push_str(&doc.trailing_ws);
            }
        }
        out
    }

    /// Render a single subtree (preserve rules), leading whitespace
    /// included. Flags are not cleared.
    pub fn render_node(&self, doc: &Document, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(doc, id, &mut out);
        out
    }

    fn skip_for_config(&self, doc: &Document, id: NodeId) -> bool {
        match doc.node(id).map(|n| &n.data) {
            Some(NodeData::Comment(_)) => !self.config.comment_preservation,
            Some(NodeData::Pi(_)) => !self.config.pi_preservation,
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Preserve / compact walk
    // ------------------------------------------------------------------

    fn write_node(&self, doc: &Document, id: NodeId, out: &mut String) {
        let Some(node) = doc.node(id) else { return };
        let preserve = self.config.whitespace_preservation;
        match &node.data {
            NodeData::Document { .. } => {
                for child in doc.children(id) {
                    if !self.skip_for_config(doc, child) {
                        self.write_node(doc, child, out);
                    }
                }
            }
            NodeData::Element(el) => self.write_element(doc, id, el, node.modified, out),
            NodeData::Text(t) => {
                if !preserve && t.content.chars().all(|c| c.is_ascii_whitespace()) {
                    return;
                }
                if t.cdata {
                    out.push_str("<![CDATA[");
                    out.push_str(&t.content);
                    out.push_str("]]>");
                } else if !node.modified {
                    match &t.raw {
                        Some(raw) => out.push_str(raw),
                        None => out.push_str(&entities::encode_text(&t.content)),
                    }
                } else {
                    out.push_str(&entities::encode_text(&t.content));
                }
            }
            NodeData::Comment(c) => {
                if preserve {
                    out.push_str(&c.preceding_ws);
                }
                out.push_str("<!--");
                out.push_str(&c.content);
                out.push_str("-->");
                if preserve {
                    out.push_str(&c.following_ws);
                }
            }
            NodeData::Pi(pi) => {
                if preserve {
                    out.push_str(&pi.preceding_ws);
                }
                match (&pi.raw, node.modified) {
                    (Some(raw), false) => out.push_str(raw),
                    _ => {
                        out.push_str("<?");
                        out.push_str(&pi.target);
                        if !pi.data.is_empty() {
                            out.push(' ');
                            out.push_str(&pi.data);
                        }
                        out.push_str("?>");
                    }
                }
                if preserve {
                    out.push_str(&pi.following_ws);
                }
            }
        }
    }

    fn write_element(
        &self,
        doc: &Document,
        id: NodeId,
        el: &ElementData,
        modified: bool,
        out: &mut String,
    ) {
        let preserve = self.config.whitespace_preservation;
        if preserve {
            out.push_str(&el.preceding_ws);
        }

        let childless = el.children.is_empty();
        match (&el.raw_open_tag, modified) {
            (Some(raw), false) if preserve => out.push_str(raw),
            _ => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attributes {
                    self.write_attribute(attr, out);
                }
                if preserve {
                    out.push_str(&el.open_tag_ws);
                }
                if el.self_closing && childless {
                    out.push_str("/>");
                } else {
                    out.push('>');
                }
            }
        }
        if el.self_closing && childless {
            return;
        }

        if preserve {
            out.push_str(&el.inner_following_ws);
        }
        for child in doc.children(id) {
            if !self.skip_for_config(doc, child) {
                self.write_node(doc, child, out);
            }
        }
        if preserve {
            out.push_str(&el.inner_preceding_ws);
        }

        match (&el.raw_close_tag, modified) {
            (Some(raw), false) if preserve => out.push_str(raw),
            _ => {
                out.push_str("</");
                if preserve {
                    out.push_str(&el.close_tag_ws);
                }
                out.push_str(&el.name);
                out.push('>');
            }
        }
    }

    fn write_attribute(&self, attr: &Attribute, out: &mut String) {
        if self.config.whitespace_preservation {
            out.push_str(&attr.preceding_ws);
        } else {
            out.push(' ');
        }
        out.push_str(&attr.name);
        out.push('=');
        let quote = attr.quote.as_char();
        out.push(quote);
        match (&attr.raw_value, attr.modified) {
            (Some(raw), false) => out.push_str(raw),
            _ => out.push_str(&entities::encode_attribute(&attr.value, quote)),
        }
        out.push(quote);
    }

    // ------------------------------------------------------------------
    // Pretty walk
    // ------------------------------------------------------------------

    fn indent(&self, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str(&self.config.indent_string);
        }
    }

    fn write_pretty(&self, doc: &Document, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = doc.node(id) else { return };
        match &node.data {
            NodeData::Element(el) => self.write_element_pretty(doc, id, el, depth, out),
            NodeData::Comment(c) => {
                out.push_str("<!--");
                out.push_str(&c.content);
                out.push_str("-->");
            }
            NodeData::Pi(pi) => {
                out.push_str("<?");
                out.push_str(&pi.target);
                if !pi.data.is_empty() {
                    out.push(' ');
                    out.push_str(&pi.data);
                }
                out.push_str("?>");
            }
            _ => self.write_node(doc, id, out),
        }
    }

    fn write_element_pretty(
        &self,
        doc: &Document,
        id: NodeId,
        el: &ElementData,
        depth: usize,
        out: &mut String,
    ) {
        out.push('<');
        out.push_str(&el.name);
        for attr in &el.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push('=');
            let quote = attr.quote.as_char();
            out.push(quote);
            match (&attr.raw_value, attr.modified) {
                (Some(raw), false) => out.push_str(raw),
                _ => out.push_str(&entities::encode_attribute(&attr.value, quote)),
            }
            out.push(quote);
        }

        // Whitespace-only text disappears in pretty mode; it is exactly
        // what re-indentation replaces.
        let visible: Vec<NodeId> = doc
            .children(id)
            .filter(|&c| {
                if self.skip_for_config(doc, c) {
                    return false;
                }
                match doc.node(c).and_then(|n| n.as_text()) {
                    Some(t) => !t.is_whitespace_only(),
                    None => true,
                }
            })
            .collect();

        if visible.is_empty() {
            if el.self_closing {
                out.push_str("/>");
            } else {
                out.push_str("></");
                out.push_str(&el.name);
                out.push('>');
            }
            return;
        }
        out.push('>');

        let has_element_children = visible
            .iter()
            .any(|&c| doc.node(c).map(|n| n.is_element()).unwrap_or(false));

        for &child in &visible {
            // Only element children move to their own line; text, comments
            // and PIs stay inline so mixed content keeps its spacing.
            let is_element = doc.node(child).map(|n| n.is_element()).unwrap_or(false);
            if is_element {
                out.push_str(&self.config.line_ending);
                self.indent(depth + 1, out);
            }
            self.write_pretty(doc, child, depth + 1, out);
        }

        if has_element_children {
            out.push_str(&self.config.line_ending);
            self.indent(depth, out);
        }
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    }
}

fn encoding_uses_bom(encoding: &str) -> bool {
    let lower = encoding.to_ascii_lowercase();
    lower.starts_with("utf-8") || lower.starts_with("utf-16") || lower.starts_with("utf-32")
}

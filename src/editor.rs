//! Structural mutation API.
//!
//! Every operation validates all of its inputs before the first write to
//! the tree, so a returned error means the document is exactly as it was
//! before the call. Successful operations update modification flags and
//! pull formatting for new content from the inference engine.

use crate::config::Config;
use crate::core::scanner::{is_name_byte, is_name_start_byte};
use crate::dom::document::{Document, DOCUMENT_NODE};
use crate::dom::node::{Attribute, Node, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::format;
use crate::serializer::Serializer;

pub struct Editor {
    doc: Document,
    config: Config,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Editor {
            doc,
            config: Config::default(),
        }
    }

    pub fn with_config(doc: Document, config: Config) -> Self {
        Editor { doc, config }
    }

    /// Parse and wrap in one step.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Editor::new(Document::parse(text)?))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Dominant line terminator of the underlying document; useful for
    /// building a `Config` that matches the file being edited.
    pub fn detected_line_ending(&self) -> &'static str {
        format::detect_line_ending(&self.doc)
    }

    /// Render the document under this editor's configuration and mark
    /// the tree clean.
    pub fn to_xml(&mut self) -> String {
        Serializer::new(self.config.clone()).serialize(&mut self.doc)
    }

    // ------------------------------------------------------------------
    // Element insertion
    // ------------------------------------------------------------------

    /// Append a new child element, indented per its siblings.
    pub fn add_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let len = self.container_len(parent)?;
        self.insert_element(parent, len, name)
    }

    /// Append a new child element containing only `text`, with no
    /// whitespace between the tags.
    pub fn add_element_with_text(&mut self, parent: NodeId, name: &str, text: &str) -> Result<NodeId> {
        let id = self.add_element(parent, name)?;
        if !text.is_empty() {
            let text_id = self.doc.push_node(Node::text(text));
            self.doc.append_child(id, text_id);
        }
        Ok(id)
    }

    pub fn insert_element_at(&mut self, parent: NodeId, index: usize, name: &str) -> Result<NodeId> {
        let len = self.container_len(parent)?;
        if index > len {
            return Err(Error::edit(format!(
                "index {index} out of bounds for {len} children"
            )));
        }
        self.insert_element(parent, index, name)
    }

    pub fn insert_element_before(&mut self, sibling: NodeId, name: &str) -> Result<NodeId> {
        let (parent, index) = self.locate(sibling)?;
        self.insert_element(parent, index, name)
    }

    pub fn insert_element_after(&mut self, sibling: NodeId, name: &str) -> Result<NodeId> {
        let (parent, index) = self.locate(sibling)?;
        self.insert_element(parent, index + 1, name)
    }

    fn insert_element(&mut self, parent: NodeId, index: usize, name: &str) -> Result<NodeId> {
        validate_name(name)?;
        self.require_container(parent)?;
        if parent == DOCUMENT_NODE {
            return Err(Error::edit("document already has a root element"));
        }

        let ws = format::infer_child_ws(&self.doc, parent, index, &self.config);
        self.prepare_for_children(parent);
        let mut node = Node::element(name);
        node.set_preceding_ws(ws.preceding);
        let id = self.doc.push_node(node);
        self.doc.attach_child(parent, index, id);
        if let Some(inner) = ws.parent_inner_preceding {
            if let Some(el) = self.doc.node_mut(parent).and_then(|n| n.as_element_mut()) {
                if el.inner_preceding_ws.is_empty() {
                    el.inner_preceding_ws = inner;
                }
            }
        }
        self.doc.mark_modified(id);
        log::trace!(target: "lossless_xml.editor", "inserted <{name}> under node {parent} at {index}");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Detach a node from the tree. The document container and the root
    /// element are off limits.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == DOCUMENT_NODE {
            return Err(Error::edit("cannot remove the document node"));
        }
        if Some(id) == self.doc.root_element() {
            return Err(Error::edit("cannot remove the root element"));
        }
        let (parent, _) = self.locate(id)?;
        self.doc.detach_child(id);
        self.cleanup_after_removal(parent);
        self.doc.mark_modified(parent);
        Ok(())
    }

    fn cleanup_after_removal(&mut self, parent: NodeId) {
        let childless = self
            .doc
            .node(parent)
            .map(|n| n.children().is_empty())
            .unwrap_or(false);
        if childless {
            if let Some(el) = self.doc.node_mut(parent).and_then(|n| n.as_element_mut()) {
                el.inner_following_ws.clear();
                el.inner_preceding_ws.clear();
            }
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Set or add an attribute. An existing attribute keeps its quote
    /// style and spacing; a new one gets both inferred from the element.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;
        self.require_element(element)?;

        let config = self.config.clone();
        let el = self
            .doc
            .node_mut(element)
            .and_then(|n| n.as_element_mut())
            .ok_or_else(|| Error::edit("not an element"))?;
        match el.attribute_mut(name) {
            Some(attr) => {
                attr.value = value.to_string();
                attr.raw_value = None;
                attr.modified = true;
            }
            None => {
                let mut attr = Attribute::new(name, value, format::infer_quote_style(&el.attributes, &config));
                attr.preceding_ws = format::infer_attribute_ws(&el.attributes);
                el.attributes.push(attr);
            }
        }
        el.raw_open_tag = None;
        self.doc.mark_modified(element);
        log::trace!(target: "lossless_xml.editor", "set {name}={value:?} on node {element}");
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<bool> {
        self.require_element(element)?;
        let el = self
            .doc
            .node_mut(element)
            .and_then(|n| n.as_element_mut())
            .ok_or_else(|| Error::edit("not an element"))?;
        let before = el.attributes.len();
        el.attributes.retain(|a| a.name != name);
        let removed = el.attributes.len() != before;
        if removed {
            el.raw_open_tag = None;
            self.doc.mark_modified(element);
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Text content
    // ------------------------------------------------------------------

    /// Replace the element's text children with a single text node.
    pub fn set_text(&mut self, element: NodeId, text: &str) -> Result<()> {
        self.require_element(element)?;
        self.replace_text_children(element, text.to_string(), false);
        Ok(())
    }

    /// Replace the element's textual content while keeping the leading
    /// and trailing whitespace pattern of the existing content.
    pub fn set_text_preserving_whitespace(&mut self, element: NodeId, text: &str) -> Result<()> {
        self.require_element(element)?;

        let mut children_text = String::new();
        for child in self.doc.children(element) {
            if let Some(t) = self.doc.node(child).and_then(|n| n.as_text()) {
                children_text.push_str(&t.content);
            }
        }
        // All-whitespace content counts as leading.
        let leading_end = children_text
            .find(|c: char| !c.is_ascii_whitespace())
            .unwrap_or(children_text.len());
        let trailing_start = children_text
            .rfind(|c: char| !c.is_ascii_whitespace())
            .map(|p| p + children_text[p..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(children_text.len());
        let content = format!(
            "{}{}{}",
            &children_text[..leading_end],
            text,
            &children_text[trailing_start..]
        );
        self.replace_text_children(element, content, true);
        Ok(())
    }

    fn replace_text_children(&mut self, element: NodeId, content: String, keep_inner_ws: bool) {
        let text_children: Vec<NodeId> = self
            .doc
            .children(element)
            .filter(|&c| self.doc.kind(c) == Some(NodeKind::Text))
            .collect();
        for child in text_children {
            self.doc.detach_child(child);
        }
        self.prepare_for_children(element);
        if !keep_inner_ws {
            if let Some(el) = self.doc.node_mut(element).and_then(|n| n.as_element_mut()) {
                el.inner_following_ws.clear();
                el.inner_preceding_ws.clear();
            }
        }
        if !content.is_empty() {
            let text_id = self.doc.push_node(Node::text(content));
            self.doc.append_child(element, text_id);
        }
        self.doc.mark_modified(element);
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Append a comment node to a container.
    pub fn add_comment(&mut self, parent: NodeId, content: &str) -> Result<NodeId> {
        self.require_container(parent)?;
        validate_comment_body(content)?;
        let index = self.container_len(parent)?;
        let ws = format::infer_child_ws(&self.doc, parent, index, &self.config);
        self.prepare_for_children(parent);
        let mut node = Node::comment(content);
        node.set_preceding_ws(ws.preceding);
        let id = self.doc.push_node(node);
        self.doc.attach_child(parent, index, id);
        self.doc.mark_modified(id);
        Ok(id)
    }

    /// Serialize a node, wrap it in a comment, and swap the comment in at
    /// the node's position. The node's leading whitespace moves to the
    /// comment.
    pub fn comment_out(&mut self, id: NodeId) -> Result<NodeId> {
        if Some(id) == self.doc.root_element() {
            return Err(Error::edit("cannot comment out the root element"));
        }
        let (parent, index) = self.locate(id)?;
        let preceding = self.doc.node(id).map(|n| n.preceding_ws().to_string()).unwrap_or_default();
        let body = Serializer::new(self.config.clone()).render_node(&self.doc, id);
        let content = wrap_comment_body(body.trim())?;

        self.doc.detach_child(id);
        let mut comment = Node::comment(content);
        comment.set_preceding_ws(preceding);
        let comment_id = self.doc.push_node(comment);
        self.doc.attach_child(parent, index, comment_id);
        self.doc.mark_modified(comment_id);
        log::trace!(target: "lossless_xml.editor", "commented out node {id} as {comment_id}");
        Ok(comment_id)
    }

    /// Comment out an inclusive, contiguous range of siblings as one
    /// comment.
    pub fn comment_out_range(&mut self, first: NodeId, last: NodeId) -> Result<NodeId> {
        let (parent, first_index) = self.locate(first)?;
        let (last_parent, last_index) = self.locate(last)?;
        if parent != last_parent {
            return Err(Error::edit("range endpoints have different parents"));
        }
        if first_index > last_index {
            return Err(Error::edit("range endpoints are in the wrong order"));
        }
        let ids: Vec<NodeId> = self.doc.children(parent).collect();
        let range: Vec<NodeId> = ids[first_index..=last_index].to_vec();
        if let Some(root) = self.doc.root_element() {
            if range.contains(&root) {
                return Err(Error::edit("cannot comment out the root element"));
            }
        }
        let serializer = Serializer::new(self.config.clone());
        let mut body = String::new();
        for &node in &range {
            body.push_str(&serializer.render_node(&self.doc, node));
        }
        let content = wrap_comment_body(body.trim())?;
        let preceding = self
            .doc
            .node(first)
            .map(|n| n.preceding_ws().to_string())
            .unwrap_or_default();

        for &node in &range {
            self.doc.detach_child(node);
        }
        let mut comment = Node::comment(content);
        comment.set_preceding_ws(preceding);
        let comment_id = self.doc.push_node(comment);
        self.doc.attach_child(parent, first_index, comment_id);
        self.doc.mark_modified(comment_id);
        Ok(comment_id)
    }

    /// Re-parse a comment's body and swap the parsed element in at the
    /// comment's position. The body must contain exactly one well-formed
    /// element (surrounding whitespace allowed).
    pub fn uncomment(&mut self, comment: NodeId) -> Result<NodeId> {
        let (parent, index) = self.locate(comment)?;
        let node = self
            .doc
            .node(comment)
            .ok_or_else(|| Error::edit("no such node"))?;
        let body = node
            .as_comment()
            .ok_or_else(|| Error::edit("uncomment target is not a comment"))?
            .content
            .clone();
        let preceding = node.preceding_ws().to_string();

        let fragment = Document::parse_fragment(&body)
            .map_err(|_| Error::edit("comment body is not well-formed XML"))?;
        let wrapper = fragment
            .root_element()
            .ok_or_else(|| Error::edit("comment body is empty"))?;
        // The body must hold exactly one element, with nothing else
        // besides whitespace.
        let mut element = None;
        for child in fragment.children(wrapper) {
            let Some(node) = fragment.node(child) else { continue };
            match node.kind() {
                NodeKind::Element => {
                    if element.is_some() {
                        return Err(Error::edit("comment body contains more than one element"));
                    }
                    element = Some(child);
                }
                NodeKind::Text => {
                    let ws_only = node.as_text().map(|t| t.is_whitespace_only()).unwrap_or(false);
                    if !ws_only {
                        return Err(Error::edit("comment body mixes text with the element"));
                    }
                }
                _ => {
                    return Err(Error::edit("comment body mixes other markup with the element"));
                }
            }
        }
        let element =
            element.ok_or_else(|| Error::edit("comment body contains no element"))?;

        let new_id = self
            .doc
            .import_subtree(&fragment, element)
            .ok_or_else(|| Error::edit("comment body contains no element"))?;
        if let Some(n) = self.doc.node_mut(new_id) {
            n.set_preceding_ws(preceding);
        }
        self.doc.detach_child(comment);
        self.doc.attach_child(parent, index, new_id);
        self.doc.mark_modified(new_id);
        log::trace!(target: "lossless_xml.editor", "uncommented node {comment} into {new_id}");
        Ok(new_id)
    }

    /// Append a processing instruction node to a container.
    pub fn add_processing_instruction(
        &mut self,
        parent: NodeId,
        target: &str,
        data: &str,
    ) -> Result<NodeId> {
        validate_name(target)?;
        self.require_container(parent)?;
        let index = self.container_len(parent)?;
        let ws = format::infer_child_ws(&self.doc, parent, index, &self.config);
        self.prepare_for_children(parent);
        let mut node = Node::processing_instruction(target, data);
        node.set_preceding_ws(ws.preceding);
        let id = self.doc.push_node(node);
        self.doc.attach_child(parent, index, id);
        self.doc.mark_modified(id);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Validation helpers
    // ------------------------------------------------------------------

    fn require_element(&self, id: NodeId) -> Result<()> {
        match self.doc.node(id) {
            Some(node) if node.is_element() => {
                if self.doc.is_attached(id) {
                    Ok(())
                } else {
                    Err(Error::edit(format!("node {id} is detached")))
                }
            }
            Some(_) => Err(Error::edit(format!("node {id} is not an element"))),
            None => Err(Error::edit(format!("no such node {id}"))),
        }
    }

    fn require_container(&self, id: NodeId) -> Result<()> {
        match self.doc.node(id).map(|n| n.kind()) {
            Some(NodeKind::Element) => self.require_element(id),
            Some(NodeKind::Document) => Ok(()),
            Some(_) => Err(Error::edit(format!("node {id} cannot hold children"))),
            None => Err(Error::edit(format!("no such node {id}"))),
        }
    }

    fn container_len(&self, id: NodeId) -> Result<usize> {
        self.require_container(id)?;
        Ok(self.doc.node(id).map(|n| n.children().len()).unwrap_or(0))
    }

    /// Parent and index of an attached, non-document node.
    fn locate(&self, id: NodeId) -> Result<(NodeId, usize)> {
        if self.doc.node(id).is_none() {
            return Err(Error::edit(format!("no such node {id}")));
        }
        if !self.doc.is_attached(id) || id == DOCUMENT_NODE {
            return Err(Error::edit(format!("node {id} has no parent")));
        }
        let parent = self
            .doc
            .parent(id)
            .ok_or_else(|| Error::edit(format!("node {id} has no parent")))?;
        let index = self
            .doc
            .sibling_index(id)
            .ok_or_else(|| Error::edit(format!("node {id} has no parent")))?;
        Ok((parent, index))
    }

    /// A self-closing tag cannot hold content; switch it to open/close
    /// form and drop the now-stale raw tag.
    fn prepare_for_children(&mut self, id: NodeId) {
        if let Some(el) = self.doc.node_mut(id).and_then(|n| n.as_element_mut()) {
            if el.self_closing {
                el.self_closing = false;
                el.raw_open_tag = None;
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let valid = match bytes.first() {
        Some(&b) => {
            is_name_start_byte(b) && bytes[1..].iter().all(|&b| is_name_byte(b))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::edit(format!("'{name}' is not a valid XML name")))
    }
}

fn validate_comment_body(content: &str) -> Result<()> {
    if content.contains("--") {
        Err(Error::edit("comment content must not contain '--'"))
    } else {
        Ok(())
    }
}

fn wrap_comment_body(trimmed: &str) -> Result<String> {
    validate_comment_body(trimmed)?;
    Ok(format!(" {trimmed} "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuoteStyle;

    fn editor(input: &str) -> Editor {
        Editor::parse(input).unwrap()
    }

    #[test]
    fn test_add_element_inherits_sibling_indentation() {
        let mut ed = editor("<deps>\n    <dep>x</dep>\n</deps>");
        let root = ed.document().root_element().unwrap();
        let new = ed.add_element(root, "dep").unwrap();
        assert_eq!(ed.document().node(new).unwrap().preceding_ws(), "\n    ");
        assert_eq!(
            ed.to_xml(),
            "<deps>\n    <dep>x</dep>\n    <dep></dep>\n</deps>"
        );
    }

    #[test]
    fn test_add_element_with_text_has_no_inner_ws() {
        let mut ed = editor("<deps>\n    <dep>x</dep>\n</deps>");
        let root = ed.document().root_element().unwrap();
        ed.add_element_with_text(root, "dep", "y").unwrap();
        assert_eq!(
            ed.to_xml(),
            "<deps>\n    <dep>x</dep>\n    <dep>y</dep>\n</deps>"
        );
    }

    #[test]
    fn test_insert_into_empty_element_derives_indentation() {
        let mut ed = editor("<a>\n  <b></b>\n</a>");
        let b = ed.document().descendant_by_name(DOCUMENT_NODE, "b").unwrap();
        let config = Config::default().with_indent_string("  ");
        ed = Editor::with_config(ed.into_document(), config);
        ed.add_element_with_text(b, "c", "1").unwrap();
        assert_eq!(
            ed.to_xml(),
            "<a>\n  <b>\n    <c>1</c>\n  </b>\n</a>"
        );
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut ed = editor("<r><a/><c/></r>");
        let root = ed.document().root_element().unwrap();
        let c = ed.document().child_by_name(root, "c").unwrap();
        ed.insert_element_before(c, "b").unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        ed.insert_element_after(a, "a2").unwrap();
        let names: Vec<_> = ed
            .document()
            .child_elements(root)
            .filter_map(|id| ed.document().element_name(id).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn test_insert_at_bounds_checked() {
        let mut ed = editor("<r><a/></r>");
        let root = ed.document().root_element().unwrap();
        assert!(ed.insert_element_at(root, 5, "b").is_err());
        // Failed call left the tree untouched.
        assert_eq!(ed.document().child_elements(root).count(), 1);
        assert!(ed.insert_element_at(root, 1, "b").is_ok());
    }

    #[test]
    fn test_second_root_rejected() {
        let mut ed = editor("<r/>");
        let err = ed.add_element(DOCUMENT_NODE, "other").unwrap_err();
        assert!(matches!(err, Error::StructuralEdit(_)));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut ed = editor("<r/>");
        let root = ed.document().root_element().unwrap();
        assert!(ed.add_element(root, "bad name").is_err());
        assert!(ed.add_element(root, "1st").is_err());
        assert!(ed.add_element(root, "").is_err());
        assert!(ed.set_attribute(root, "x y", "1").is_err());
    }

    #[test]
    fn test_remove_node_and_root_protection() {
        let mut ed = editor("<r>\n  <a/>\n  <b/>\n</r>");
        let root = ed.document().root_element().unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        ed.remove_node(a).unwrap();
        assert_eq!(ed.document().child_elements(root).count(), 1);
        assert!(ed.remove_node(root).is_err());
        assert!(ed.remove_node(DOCUMENT_NODE).is_err());
    }

    #[test]
    fn test_remove_last_child_collapses_inner_ws() {
        let mut ed = editor("<r>\n  <a/>\n</r>");
        let root = ed.document().root_element().unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        ed.remove_node(a).unwrap();
        assert_eq!(ed.to_xml(), "<r></r>");
    }

    #[test]
    fn test_stale_id_rejected() {
        let mut ed = editor("<r><a><x/></a></r>");
        let root = ed.document().root_element().unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        let x = ed.document().child_by_name(a, "x").unwrap();
        ed.remove_node(a).unwrap();
        // x went with its parent; edits through it must fail.
        assert!(ed.set_attribute(x, "k", "v").is_err());
        assert!(ed.remove_node(x).is_err());
    }

    #[test]
    fn test_set_attribute_infers_quotes_and_spacing() {
        let mut ed = editor("<e scope='test'/>");
        let root = ed.document().root_element().unwrap();
        ed.set_attribute(root, "optional", "true").unwrap();
        assert_eq!(ed.to_xml(), "<e scope='test' optional='true'/>");
    }

    #[test]
    fn test_set_attribute_updates_in_place() {
        let mut ed = editor("<e  a='1'  b='2' />");
        let root = ed.document().root_element().unwrap();
        ed.set_attribute(root, "a", "9").unwrap();
        // Quote style, attribute order and spacing survive the update.
        assert_eq!(ed.to_xml(), "<e  a='9'  b='2' />");
    }

    #[test]
    fn test_remove_attribute() {
        let mut ed = editor("<e a=\"1\" b=\"2\"/>");
        let root = ed.document().root_element().unwrap();
        assert_eq!(ed.remove_attribute(root, "a").unwrap(), true);
        assert_eq!(ed.remove_attribute(root, "a").unwrap(), false);
        assert_eq!(ed.to_xml(), "<e b=\"2\"/>");
    }

    #[test]
    fn test_set_text() {
        let mut ed = editor("<a><b>1</b></a>");
        let root = ed.document().root_element().unwrap();
        let b = ed.document().child_by_name(root, "b").unwrap();
        ed.set_text(b, "2").unwrap();
        assert_eq!(ed.to_xml(), "<a><b>2</b></a>");
    }

    #[test]
    fn test_set_text_escapes() {
        let mut ed = editor("<a><b>1</b></a>");
        let root = ed.document().root_element().unwrap();
        let b = ed.document().child_by_name(root, "b").unwrap();
        ed.set_text(b, "a < b & c").unwrap();
        assert_eq!(ed.to_xml(), "<a><b>a &lt; b &amp; c</b></a>");
    }

    #[test]
    fn test_set_text_preserving_whitespace() {
        let mut ed = editor("<a>\n  old value\n</a>");
        let root = ed.document().root_element().unwrap();
        ed.set_text_preserving_whitespace(root, "new").unwrap();
        assert_eq!(ed.to_xml(), "<a>\n  new\n</a>");
    }

    #[test]
    fn test_add_comment() {
        let mut ed = editor("<r>\n  <a/>\n</r>");
        let root = ed.document().root_element().unwrap();
        ed.add_comment(root, " note ").unwrap();
        assert_eq!(ed.to_xml(), "<r>\n  <a/>\n  <!-- note -->\n</r>");
        assert!(ed.add_comment(root, "a -- b").is_err());
    }

    #[test]
    fn test_comment_out_keeps_indentation() {
        let mut ed = editor("<deps>\n    <dependency><g>x</g></dependency>\n</deps>");
        let root = ed.document().root_element().unwrap();
        let dep = ed.document().child_by_name(root, "dependency").unwrap();
        let comment = ed.comment_out(dep).unwrap();
        assert_eq!(ed.document().node(comment).unwrap().preceding_ws(), "\n    ");
        assert_eq!(
            ed.to_xml(),
            "<deps>\n    <!-- <dependency><g>x</g></dependency> -->\n</deps>"
        );
    }

    #[test]
    fn test_comment_out_root_rejected() {
        let mut ed = editor("<r><a/></r>");
        let root = ed.document().root_element().unwrap();
        assert!(ed.comment_out(root).is_err());
    }

    #[test]
    fn test_comment_out_range() {
        let mut ed = editor("<r>\n  <a/>\n  <b/>\n  <c/>\n</r>");
        let root = ed.document().root_element().unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        let b = ed.document().child_by_name(root, "b").unwrap();
        ed.comment_out_range(a, b).unwrap();
        assert_eq!(ed.to_xml(), "<r>\n  <!-- <a/>\n  <b/> -->\n  <c/>\n</r>");
    }

    #[test]
    fn test_comment_out_range_validation() {
        let mut ed = editor("<r><a><x/></a><b/></r>");
        let root = ed.document().root_element().unwrap();
        let a = ed.document().child_by_name(root, "a").unwrap();
        let b = ed.document().child_by_name(root, "b").unwrap();
        let x = ed.document().child_by_name(a, "x").unwrap();
        assert!(ed.comment_out_range(x, b).is_err());
        assert!(ed.comment_out_range(b, a).is_err());
    }

    #[test]
    fn test_uncomment() {
        let mut ed = editor("<r>\n  <!-- <a k=\"1\">text</a> -->\n</r>");
        let root = ed.document().root_element().unwrap();
        let comment = ed.document().children(root).next().unwrap();
        let element = ed.uncomment(comment).unwrap();
        assert_eq!(ed.document().element_name(element), Some("a"));
        assert_eq!(ed.document().attribute(element, "k"), Some("1"));
        assert_eq!(ed.document().node(element).unwrap().preceding_ws(), "\n  ");
        assert_eq!(ed.to_xml(), "<r>\n  <a k=\"1\">text</a>\n</r>");
    }

    #[test]
    fn test_uncomment_rejects_bad_bodies() {
        let mut ed = editor(
            "<r><!-- <a/><b/> --><!-- no markup --><!-- <broken --><!-- <a/> <?pi d?> --></r>",
        );
        let root = ed.document().root_element().unwrap();
        let comments: Vec<NodeId> = ed.document().children(root).collect();
        for &comment in &comments {
            let err = ed.uncomment(comment).unwrap_err();
            assert!(matches!(err, Error::StructuralEdit(_)), "{err}");
            // Messages describe the body, not the parsing internals.
            assert!(!err.to_string().contains("fragment"), "{err}");
        }
        // Nothing changed.
        assert_eq!(ed.document().children(root).count(), 4);
    }

    #[test]
    fn test_uncomment_inverts_comment_out() {
        let mut ed = editor("<deps>\n    <dep scope='test'><g>x</g></dep>\n    <other/>\n</deps>");
        let root = ed.document().root_element().unwrap();
        let dep = ed.document().child_by_name(root, "dep").unwrap();
        let comment = ed.comment_out(dep).unwrap();
        let restored = ed.uncomment(comment).unwrap();
        assert_eq!(ed.document().element_name(restored), Some("dep"));
        assert_eq!(ed.document().attribute(restored, "scope"), Some("test"));
        assert_eq!(ed.document().text_content(ed.document().child_by_name(restored, "g").unwrap()), "x");
        assert_eq!(ed.document().node(restored).unwrap().preceding_ws(), "\n    ");
    }

    #[test]
    fn test_failed_ops_leave_tree_untouched() {
        let mut ed = editor("<r>\n  <a/>\n</r>");
        let before = ed.document().to_xml();
        let root = ed.document().root_element().unwrap();
        assert!(ed.add_element(root, "bad name").is_err());
        assert!(ed.remove_node(root).is_err());
        assert!(ed.insert_element_at(root, 99, "x").is_err());
        assert_eq!(ed.document().to_xml(), before);
    }

    #[test]
    fn test_self_closing_parent_expanded() {
        let mut ed = editor("<r><e/></r>");
        let root = ed.document().root_element().unwrap();
        let e = ed.document().child_by_name(root, "e").unwrap();
        ed.set_text(e, "x").unwrap();
        assert_eq!(ed.to_xml(), "<r><e>x</e></r>");
    }

    #[test]
    fn test_add_processing_instruction() {
        let mut ed = editor("<r>\n  <a/>\n</r>");
        let root = ed.document().root_element().unwrap();
        ed.add_processing_instruction(root, "target", "data").unwrap();
        assert_eq!(ed.to_xml(), "<r>\n  <a/>\n  <?target data?>\n</r>");
    }

    #[test]
    fn test_quote_style_tie_uses_config_default() {
        let config = Config::default().with_default_quote_style(QuoteStyle::Single);
        let doc = Document::parse("<e a='1' b=\"2\"/>").unwrap();
        let mut ed = Editor::with_config(doc, config);
        let root = ed.document().root_element().unwrap();
        ed.set_attribute(root, "c", "3").unwrap();
        assert_eq!(ed.to_xml(), "<e a='1' b=\"2\" c='3'/>");
    }
}

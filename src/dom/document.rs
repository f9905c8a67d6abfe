//! Arena-backed document tree.
//!
//! All nodes of one document live in a single `Vec`, addressed by
//! [`NodeId`]. Node 0 is the document container. Detached nodes keep
//! their slot (ids stay stable); they simply become unreachable.

use crate::dom::builder;
use crate::dom::node::{Node, NodeData, NodeId, NodeKind};
use crate::error::{Error, Result};

/// Id of the document container node.
pub const DOCUMENT_NODE: NodeId = 0;

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) version: Option<String>,
    pub(crate) encoding: String,
    pub(crate) standalone: Option<bool>,
    /// Raw `<?xml ...?>` text, verbatim.
    pub(crate) xml_declaration: Option<String>,
    /// Raw DOCTYPE text, verbatim, with the whitespace before it.
    pub(crate) doctype: Option<String>,
    pub(crate) doctype_ws: String,
    pub(crate) bom: bool,
    /// Whitespace after the last top-level node.
    pub(crate) trailing_ws: String,
}

impl Document {
    pub(crate) fn empty() -> Self {
        Document {
            nodes: vec![Node::document()],
            version: None,
            encoding: "UTF-8".to_string(),
            standalone: None,
            xml_declaration: None,
            doctype: None,
            doctype_ws: String::new(),
            bom: false,
            trailing_ws: String::new(),
        }
    }

    /// Parse a complete document from decoded text.
    pub fn parse(text: &str) -> Result<Document> {
        builder::parse(text)
    }

    /// Parse decoded text whose encoding was resolved by the caller's I/O
    /// layer. `encoding` overrides any declaration value; `bom` records
    /// whether the original byte stream carried one.
    pub fn parse_with_encoding(text: &str, encoding: &str, bom: bool) -> Result<Document> {
        if encoding.trim().is_empty() {
            return Err(Error::Encoding("empty encoding name".to_string()));
        }
        let mut doc = builder::parse(text)?;
        doc.encoding = encoding.to_string();
        doc.bom = doc.bom || bom;
        Ok(doc)
    }

    /// Parse a fragment by wrapping it in a synthetic root element. The
    /// returned document's root element is the wrapper; the fragment's
    /// nodes are its children.
    pub fn parse_fragment(text: &str) -> Result<Document> {
        builder::parse(&format!("<fragment>{text}</fragment>"))
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn standalone(&self) -> Option<bool> {
        self.standalone
    }

    pub fn xml_declaration(&self) -> Option<&str> {
        self.xml_declaration.as_deref()
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Synthesize a declaration from version/encoding/standalone.
    pub fn generate_xml_declaration(&self) -> String {
        let mut decl = format!(
            "<?xml version=\"{}\" encoding=\"{}\"",
            self.version.as_deref().unwrap_or("1.0"),
            self.encoding
        );
        if let Some(standalone) = self.standalone {
            decl.push_str(" standalone=\"");
            decl.push_str(if standalone { "yes" } else { "no" });
            decl.push('"');
        }
        decl.push_str("?>");
        decl
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    pub fn document_node(&self) -> NodeId {
        DOCUMENT_NODE
    }

    /// The single root element.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE)
            .find(|&id| self.node(id).map(|n| n.is_element()).unwrap_or(false))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Children of a container node, in document order. The iterator is
    /// created fresh per call and does not observe later mutations.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let ids: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children().to_vec())
            .unwrap_or_default();
        ids.into_iter()
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(move |&c| self.node(c).map(|n| n.is_element()).unwrap_or(false))
    }

    /// First child element with the given qualified name.
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|&c| self.element_name(c) == Some(name))
    }

    /// Depth-first descendants, self excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children().iter().rev().copied().collect())
            .unwrap_or_default();
        Descendants { doc: self, stack }
    }

    /// First descendant element with the given qualified name, in
    /// document order.
    pub fn descendant_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .find(|&d| self.element_name(d) == Some(name))
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.as_element().map(|el| el.name.as_str())
    }

    /// Decoded attribute value on an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.as_element()?.attribute_value(name)
    }

    /// Concatenated decoded content of the element's text children.
    /// Whitespace-only content stored in the inner whitespace fields is
    /// included.
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let Some(el) = node.as_element() else {
            return String::new();
        };
        let mut out = el.inner_following_ws.clone();
        for &child in &el.children {
            if let Some(text) = self.node(child).and_then(|n| n.as_text()) {
                out.push_str(&text.content);
            }
        }
        out.push_str(&el.inner_preceding_ws);
        out
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Position of a node within its parent's child list.
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.node(parent)?.children().iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.sibling_index(id)?;
        if index == 0 {
            None
        } else {
            self.node(parent)?.children().get(index - 1).copied()
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.sibling_index(id)?;
        self.node(parent)?.children().get(index + 1).copied()
    }

    pub fn previous_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(id);
        while let Some(sib) = current {
            if self.node(sib)?.is_element() {
                return Some(sib);
            }
            current = self.previous_sibling(sib);
        }
        None
    }

    pub fn next_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sib) = current {
            if self.node(sib)?.is_element() {
                return Some(sib);
            }
            current = self.next_sibling(sib);
        }
        None
    }

    /// Distance from the document node.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Whether `id` is still reachable from the document node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == DOCUMENT_NODE || self.is_descendant_of(id, DOCUMENT_NODE)
    }

    // ------------------------------------------------------------------
    // Structure primitives (used by the builder and editor)
    // ------------------------------------------------------------------

    pub(crate) fn attach_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(children) = self.node_mut(parent).and_then(|n| n.children_mut()) {
            let index = index.min(children.len());
            children.insert(index, child);
        }
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.node(parent).map(|n| n.children().len()).unwrap_or(0);
        self.attach_child(parent, len, child);
    }

    /// Detach a node from its parent. Returns its former index.
    pub(crate) fn detach_child(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self.sibling_index(id)?;
        if let Some(children) = self.node_mut(parent).and_then(|n| n.children_mut()) {
            children.remove(index);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
        Some(index)
    }

    /// Deep-copy a subtree from another document into this arena.
    /// The copy arrives detached and marked modified.
    pub(crate) fn import_subtree(&mut self, src: &Document, src_id: NodeId) -> Option<NodeId> {
        let node = src.node(src_id)?;
        let mut copy = node.clone();
        copy.parent = None;
        copy.modified = true;
        let child_ids: Vec<NodeId> = node.children().to_vec();
        if let Some(children) = copy.children_mut() {
            children.clear();
        }
        let new_id = self.push_node(copy);
        for child in child_ids {
            if let Some(new_child) = self.import_subtree(src, child) {
                self.append_child(new_id, new_child);
            }
        }
        Some(new_id)
    }

    // ------------------------------------------------------------------
    // Modification tracking
    // ------------------------------------------------------------------

    pub fn is_modified(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.modified).unwrap_or(false)
    }

    /// Mark a node and its ancestor chain modified. Siblings are never
    /// touched.
    pub fn mark_modified(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.node_mut(cid) {
                Some(node) => {
                    node.modified = true;
                    current = node.parent;
                }
                None => break,
            }
        }
    }

    /// Reset every modification flag (nodes and attributes), making
    /// retained raw spans authoritative again.
    pub fn clear_modified(&mut self) {
        for node in &mut self.nodes {
            node.modified = false;
            if let NodeData::Element(el) = &mut node.data {
                for attr in &mut el.attributes {
                    attr.modified = false;
                }
            }
        }
    }

    /// Render with default (preserve) configuration, without clearing
    /// modification flags.
    pub fn to_xml(&self) -> String {
        crate::serializer::Serializer::default().render(self)
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind())
    }
}

/// Depth-first pre-order walk, freshly created per call.
pub struct Descendants<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for Descendants<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(node) = self.doc.node(current) {
            for &child in node.children().iter().rev() {
                self.stack.push(child);
            }
        }
        Some(current)
    }
}

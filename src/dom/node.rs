//! Node model: a closed sum type over document/element/text/comment/PI,
//! each carrying both its decoded value and the lexical detail needed to
//! reproduce the original source.
//!
//! Nodes live in an arena owned by [`crate::Document`] and reference each
//! other by [`NodeId`]; the parent link is a non-owning id.

use crate::config::QuoteStyle;
use crate::dom::namespace;

pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    ProcessingInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Decoded value.
    pub value: String,
    /// Value exactly as written between the quotes, kept while the
    /// attribute is unmodified.
    pub raw_value: Option<String>,
    pub quote: QuoteStyle,
    /// Whitespace before the attribute name inside the tag.
    pub preceding_ws: String,
    pub modified: bool,
}

impl Attribute {
    /// A brand-new attribute; formatting comes from inference.
    pub fn new(name: impl Into<String>, value: impl Into<String>, quote: QuoteStyle) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
            raw_value: None,
            quote,
            preceding_ws: " ".to_string(),
            modified: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Qualified name, prefix included.
    pub name: String,
    /// Insertion order is significant and never re-sorted.
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeId>,
    /// Whitespace before `<name`.
    pub preceding_ws: String,
    /// Whitespace inside the open tag, before `>` or `/>`.
    pub open_tag_ws: String,
    /// Whitespace inside the close tag, between `</` and the name.
    pub close_tag_ws: String,
    /// Whitespace just after the open tag; used together with
    /// `inner_preceding_ws` when the element's only content is whitespace.
    pub inner_following_ws: String,
    /// Whitespace just before the close tag.
    pub inner_preceding_ws: String,
    pub self_closing: bool,
    /// Raw open/close tag text, authoritative while unmodified.
    pub raw_open_tag: Option<String>,
    pub raw_close_tag: Option<String>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    pub fn local_name(&self) -> &str {
        namespace::split_qualified(&self.name).1
    }

    pub fn prefix(&self) -> Option<&str> {
        namespace::split_qualified(&self.name).0
    }

    /// The URI declared by this element for `prefix` (None = default
    /// namespace), if any.
    pub fn namespace_declaration(&self, prefix: Option<&str>) -> Option<&str> {
        let wanted = match prefix {
            None => self.attribute_value("xmlns"),
            Some(p) => {
                let name = format!("xmlns:{p}");
                self.attribute(&name).map(|a| a.value.as_str())
            }
        };
        wanted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    /// Decoded content, whitespace included.
    pub content: String,
    /// Entity-encoded source form, kept while unmodified.
    pub raw: Option<String>,
    pub cdata: bool,
}

impl TextData {
    pub fn is_whitespace_only(&self) -> bool {
        self.content.chars().all(|c| c.is_ascii_whitespace())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentData {
    pub content: String,
    pub preceding_ws: String,
    pub following_ws: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiData {
    pub target: String,
    pub data: String,
    /// Full `<?...?>` source text, kept while unmodified.
    pub raw: Option<String>,
    pub preceding_ws: String,
    pub following_ws: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document container; top-level sequence of PIs, comments and
    /// exactly one root element.
    Document { children: Vec<NodeId> },
    Element(ElementData),
    Text(TextData),
    Comment(CommentData),
    Pi(PiData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub modified: bool,
    pub data: NodeData,
}

impl Node {
    pub fn document() -> Self {
        Node {
            parent: None,
            modified: false,
            data: NodeData::Document { children: Vec::new() },
        }
    }

    /// A freshly built element, considered modified until serialized.
    pub fn element(name: impl Into<String>) -> Self {
        Node {
            parent: None,
            modified: true,
            data: NodeData::Element(ElementData {
                name: name.into(),
                attributes: Vec::new(),
                children: Vec::new(),
                preceding_ws: String::new(),
                open_tag_ws: String::new(),
                close_tag_ws: String::new(),
                inner_following_ws: String::new(),
                inner_preceding_ws: String::new(),
                self_closing: false,
                raw_open_tag: None,
                raw_close_tag: None,
            }),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node {
            parent: None,
            modified: true,
            data: NodeData::Text(TextData {
                content: content.into(),
                raw: None,
                cdata: false,
            }),
        }
    }

    pub fn cdata(content: impl Into<String>) -> Self {
        Node {
            parent: None,
            modified: true,
            data: NodeData::Text(TextData {
                content: content.into(),
                raw: None,
                cdata: true,
            }),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Node {
            parent: None,
            modified: true,
            data: NodeData::Comment(CommentData {
                content: content.into(),
                preceding_ws: String::new(),
                following_ws: String::new(),
            }),
        }
    }

    pub fn processing_instruction(target: impl Into<String>, data: impl Into<String>) -> Self {
        Node {
            parent: None,
            modified: true,
            data: NodeData::Pi(PiData {
                target: target.into(),
                data: data.into(),
                raw: None,
                preceding_ws: String::new(),
                following_ws: String::new(),
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Document { .. } => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Pi(_) => NodeKind::ProcessingInstruction,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentData> {
        match &self.data {
            NodeData::Comment(c) => Some(c),
            _ => None,
        }
    }

    /// Child list of a container node (document or element).
    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Document { children } => children,
            NodeData::Element(el) => &el.children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.data {
            NodeData::Document { children } => Some(children),
            NodeData::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    /// Whitespace before this node in its parent's content. Text nodes
    /// carry whitespace inside their content instead.
    pub fn preceding_ws(&self) -> &str {
        match &self.data {
            NodeData::Element(el) => &el.preceding_ws,
            NodeData::Comment(c) => &c.preceding_ws,
            NodeData::Pi(pi) => &pi.preceding_ws,
            _ => "",
        }
    }

    pub(crate) fn set_preceding_ws(&mut self, ws: String) {
        match &mut self.data {
            NodeData::Element(el) => el.preceding_ws = ws,
            NodeData::Comment(c) => c.preceding_ws = ws,
            NodeData::Pi(pi) => pi.preceding_ws = ws,
            _ => {}
        }
    }

    /// Drop retained raw spans so serialization rebuilds this node.
    pub(crate) fn discard_raw(&mut self) {
        match &mut self.data {
            NodeData::Element(el) => {
                el.raw_open_tag = None;
                el.raw_close_tag = None;
            }
            NodeData::Text(t) => t.raw = None,
            NodeData::Pi(pi) => pi.raw = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Node::document().kind(), NodeKind::Document);
        assert_eq!(Node::element("a").kind(), NodeKind::Element);
        assert_eq!(Node::text("x").kind(), NodeKind::Text);
        assert_eq!(Node::comment("c").kind(), NodeKind::Comment);
        assert_eq!(
            Node::processing_instruction("t", "d").kind(),
            NodeKind::ProcessingInstruction
        );
    }

    #[test]
    fn test_new_nodes_are_modified() {
        assert!(Node::element("a").modified);
        assert!(Node::text("x").modified);
        assert!(!Node::document().modified);
    }

    #[test]
    fn test_element_qualified_name() {
        let node = Node::element("soap:Envelope");
        let el = node.as_element().unwrap();
        assert_eq!(el.local_name(), "Envelope");
        assert_eq!(el.prefix(), Some("soap"));
    }

    #[test]
    fn test_attribute_lookup() {
        let mut node = Node::element("e");
        node.as_element_mut()
            .unwrap()
            .attributes
            .push(Attribute::new("id", "42", QuoteStyle::Double));
        let el = node.as_element().unwrap();
        assert_eq!(el.attribute_value("id"), Some("42"));
        assert_eq!(el.attribute_value("missing"), None);
    }

    #[test]
    fn test_whitespace_only_text() {
        let node = Node::text("  \n\t ");
        assert!(node.as_text().unwrap().is_whitespace_only());
        let node = Node::text("  x ");
        assert!(!node.as_text().unwrap().is_whitespace_only());
    }
}

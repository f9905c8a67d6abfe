//! Namespace handling.
//!
//! Declarations are ordinary `xmlns`/`xmlns:prefix` attributes; there is
//! no resolution cache. A prefix is resolved by walking the ancestor
//! chain at query time, so edits to declarations are always reflected.

use crate::dom::document::Document;
use crate::dom::node::NodeId;

/// Namespace URI bound to the `xml` prefix by definition.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// Namespace URI bound to the `xmlns` prefix by definition.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// (namespace URI, local name, prefix) value triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub namespace_uri: Option<String>,
    pub local_name: String,
    pub prefix: Option<String>,
}

impl QName {
    pub fn new(namespace_uri: Option<String>, local_name: impl Into<String>, prefix: Option<String>) -> Self {
        QName {
            namespace_uri,
            local_name: local_name.into(),
            prefix,
        }
    }

    /// The name as written in markup: `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Split `prefix:local` into its parts. A name without a colon has no
/// prefix.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// Resolve `prefix` (None for the default namespace) starting at
/// `from` and walking toward the document node.
pub fn resolve_prefix<'d>(doc: &'d Document, from: NodeId, prefix: Option<&str>) -> Option<&'d str> {
    match prefix {
        Some("xml") => return Some(XML_URI),
        Some("xmlns") => return Some(XMLNS_URI),
        _ => {}
    }

    let mut current = Some(from);
    while let Some(id) = current {
        let node = doc.node(id)?;
        if let Some(el) = node.as_element() {
            if let Some(uri) = el.namespace_declaration(prefix) {
                // An empty declaration un-binds the prefix.
                return if uri.is_empty() { None } else { Some(uri) };
            }
        }
        current = node.parent;
    }
    None
}

/// Fully resolved name of an element.
pub fn element_qname(doc: &Document, element: NodeId) -> Option<QName> {
    let el = doc.node(element)?.as_element()?;
    let (prefix, local) = split_qualified(&el.name);
    let uri = resolve_prefix(doc, element, prefix);
    Some(QName::new(
        uri.map(str::to_string),
        local,
        prefix.map(str::to_string),
    ))
}

/// Fully resolved name of an attribute on `element`. Per the namespaces
/// spec an unprefixed attribute is in no namespace (it does not take the
/// default namespace).
pub fn attribute_qname(doc: &Document, element: NodeId, attr_name: &str) -> QName {
    let (prefix, local) = split_qualified(attr_name);
    let uri = match prefix {
        Some(_) => resolve_prefix(doc, element, prefix),
        None => None,
    };
    QName::new(uri.map(str::to_string), local, prefix.map(str::to_string))
}

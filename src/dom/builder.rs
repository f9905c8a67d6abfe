//! Tree builder: token stream to document tree.
//!
//! Keeps an open-element stack and routes whitespace-only character runs
//! to the formatting field they belong to: the next sibling's
//! `preceding_ws`, the enclosing element's `inner_preceding_ws` when the
//! run ends at its close tag, or the document's trailing whitespace at
//! end of input. Runs with real content become Text children carrying
//! both the decoded value and the raw source form.

use crate::core::entities;
use crate::core::tokenizer::{RawAttribute, Token, TokenKind, Tokenizer};
use crate::dom::document::{Document, DOCUMENT_NODE};
use crate::dom::node::{
    Attribute, CommentData, ElementData, Node, NodeData, NodeId, PiData, TextData,
};
use crate::error::{Error, Result};

pub(crate) fn parse(text: &str) -> Result<Document> {
    let mut tokenizer = Tokenizer::new(text);
    let mut builder = Builder {
        doc: Document::empty(),
        stack: vec![DOCUMENT_NODE],
        pending_ws: String::new(),
        seen_root: false,
        seen_content: false,
    };
    builder.doc.bom = tokenizer.had_bom();

    loop {
        let token = tokenizer.next_token()?;
        if token.kind == TokenKind::Eof {
            builder.finish(token.pos)?;
            break;
        }
        builder.consume(token)?;
    }

    log::debug!(
        target: "lossless_xml.builder",
        "built document: {} nodes, encoding {}",
        builder.doc.node_count(),
        builder.doc.encoding()
    );
    Ok(builder.doc)
}

struct Builder {
    doc: Document,
    stack: Vec<NodeId>,
    /// Whitespace-only run waiting for the node it precedes.
    pending_ws: String,
    seen_root: bool,
    /// Anything other than the declaration has been consumed.
    seen_content: bool,
}

impl Builder {
    fn parent(&self) -> NodeId {
        *self.stack.last().unwrap_or(&DOCUMENT_NODE)
    }

    fn at_document_level(&self) -> bool {
        self.stack.len() == 1
    }

    fn take_ws(&mut self) -> String {
        std::mem::take(&mut self.pending_ws)
    }

    fn append(&mut self, node: Node) -> NodeId {
        let parent = self.parent();
        let id = self.doc.push_node(node);
        self.doc.append_child(parent, id);
        id
    }

    fn consume(&mut self, token: Token<'_>) -> Result<()> {
        match token.kind {
            TokenKind::XmlDecl {
                raw,
                version,
                encoding,
                standalone,
            } => {
                if self.seen_content || !self.pending_ws.is_empty() {
                    return Err(Error::parse(
                        "XML declaration must be the first thing in the document",
                        token.pos,
                    ));
                }
                self.doc.xml_declaration = Some(raw.to_string());
                self.doc.version = version;
                if let Some(enc) = encoding {
                    self.doc.encoding = enc;
                }
                self.doc.standalone = standalone;
            }
            TokenKind::Doctype { raw } => {
                if self.doc.doctype.is_some() {
                    return Err(Error::parse("multiple DOCTYPE declarations", token.pos));
                }
                if self.seen_root {
                    return Err(Error::parse("DOCTYPE after root element", token.pos));
                }
                self.doc.doctype_ws = self.take_ws();
                self.doc.doctype = Some(raw.to_string());
                self.seen_content = true;
            }
            TokenKind::StartTag {
                name,
                attributes,
                open_ws,
                self_closing,
                raw,
            } => {
                self.start_element(name, attributes, open_ws, self_closing, raw, token.pos)?;
            }
            TokenKind::EndTag { name, close_ws, raw } => {
                self.end_element(name, close_ws, raw, token.pos)?;
            }
            TokenKind::Text { raw } => {
                if raw.bytes().all(|b| b.is_ascii_whitespace()) {
                    self.pending_ws.push_str(raw);
                } else {
                    if self.at_document_level() {
                        return Err(Error::parse("text content outside the root element", token.pos));
                    }
                    self.append(Node {
                        parent: None,
                        modified: false,
                        data: NodeData::Text(TextData {
                            content: entities::decode(raw).into_owned(),
                            raw: Some(raw.to_string()),
                            cdata: false,
                        }),
                    });
                    self.seen_content = true;
                }
            }
            TokenKind::CData { text, raw: _ } => {
                if self.at_document_level() {
                    return Err(Error::parse("CDATA section outside the root element", token.pos));
                }
                // Whitespace before a CDATA boundary stays a text child;
                // CDATA content is literal, so raw and decoded agree.
                let ws = self.take_ws();
                if !ws.is_empty() {
                    self.append(Node {
                        parent: None,
                        modified: false,
                        data: NodeData::Text(TextData {
                            content: ws.clone(),
                            raw: Some(ws),
                            cdata: false,
                        }),
                    });
                }
                self.append(Node {
                    parent: None,
                    modified: false,
                    data: NodeData::Text(TextData {
                        content: text.to_string(),
                        raw: Some(text.to_string()),
                        cdata: true,
                    }),
                });
                self.seen_content = true;
            }
            TokenKind::Comment { text } => {
                let ws = self.take_ws();
                self.append(Node {
                    parent: None,
                    modified: false,
                    data: NodeData::Comment(CommentData {
                        content: text.to_string(),
                        preceding_ws: ws,
                        following_ws: String::new(),
                    }),
                });
                self.seen_content = true;
            }
            TokenKind::Pi { target, data, raw } => {
                let ws = self.take_ws();
                self.append(Node {
                    parent: None,
                    modified: false,
                    data: NodeData::Pi(PiData {
                        target: target.to_string(),
                        data: data.to_string(),
                        raw: Some(raw.to_string()),
                        preceding_ws: ws,
                        following_ws: String::new(),
                    }),
                });
                self.seen_content = true;
            }
            TokenKind::Eof => unreachable!("Eof handled by the parse loop"),
        }
        Ok(())
    }

    fn start_element(
        &mut self,
        name: &str,
        attributes: Vec<RawAttribute<'_>>,
        open_ws: &str,
        self_closing: bool,
        raw: &str,
        pos: usize,
    ) -> Result<()> {
        if self.at_document_level() {
            if self.seen_root {
                return Err(Error::parse("more than one root element", pos));
            }
            self.seen_root = true;
        }

        let attributes = attributes
            .into_iter()
            .map(|a| Attribute {
                name: a.name.to_string(),
                value: entities::decode(a.raw_value).into_owned(),
                raw_value: Some(a.raw_value.to_string()),
                quote: a.quote,
                preceding_ws: a.preceding_ws.to_string(),
                modified: false,
            })
            .collect();

        let preceding_ws = self.take_ws();
        let id = self.append(Node {
            parent: None,
            modified: false,
            data: NodeData::Element(ElementData {
                name: name.to_string(),
                attributes,
                children: Vec::new(),
                preceding_ws,
                open_tag_ws: open_ws.to_string(),
                close_tag_ws: String::new(),
                inner_following_ws: String::new(),
                inner_preceding_ws: String::new(),
                self_closing,
                raw_open_tag: Some(raw.to_string()),
                raw_close_tag: None,
            }),
        });
        self.seen_content = true;
        if !self_closing {
            self.stack.push(id);
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str, close_ws: &str, raw: &str, pos: usize) -> Result<()> {
        if self.at_document_level() {
            return Err(Error::parse(
                format!("closing tag </{name}> without an open element"),
                pos,
            ));
        }
        let open = self.parent();
        let ws = self.take_ws();
        let element = self
            .doc
            .node_mut(open)
            .and_then(|n| n.as_element_mut())
            .ok_or_else(|| Error::parse("internal: open stack holds a non-element", pos))?;
        if element.name != name {
            return Err(Error::parse(
                format!("closing tag </{name}> does not match open <{}>", element.name),
                pos,
            ));
        }
        element.inner_preceding_ws = ws;
        element.close_tag_ws = close_ws.to_string();
        element.raw_close_tag = Some(raw.to_string());
        self.stack.pop();
        Ok(())
    }

    fn finish(&mut self, pos: usize) -> Result<()> {
        if self.stack.len() > 1 {
            let open = self.parent();
            let name = self.doc.element_name(open).unwrap_or("?").to_string();
            return Err(Error::parse(format!("unclosed element <{name}>"), pos));
        }
        if !self.seen_root {
            return Err(Error::parse("document has no root element", pos));
        }
        self.doc.trailing_ws = self.take_ws();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeKind;

    #[test]
    fn test_whitespace_routed_to_fields() {
        let doc = parse("<r>\n    <a/>\n</r>").unwrap();
        let root = doc.root_element().unwrap();
        let a = doc.child_by_name(root, "a").unwrap();
        assert_eq!(doc.node(a).unwrap().preceding_ws(), "\n    ");
        let el = doc.node(root).unwrap().as_element().unwrap();
        assert_eq!(el.inner_preceding_ws, "\n");
        // The whitespace lives in fields, not in synthetic text children.
        assert_eq!(doc.children(root).count(), 1);
    }

    #[test]
    fn test_whitespace_only_content() {
        let doc = parse("<a>\n  </a>").unwrap();
        let root = doc.root_element().unwrap();
        let el = doc.node(root).unwrap().as_element().unwrap();
        assert!(el.children.is_empty());
        assert_eq!(el.inner_preceding_ws, "\n  ");
    }

    #[test]
    fn test_text_decoded_and_raw_retained() {
        let doc = parse("<a>1 &lt; 2</a>").unwrap();
        let root = doc.root_element().unwrap();
        let text_id = doc.children(root).next().unwrap();
        let text = doc.node(text_id).unwrap().as_text().unwrap();
        assert_eq!(text.content, "1 < 2");
        assert_eq!(text.raw.as_deref(), Some("1 &lt; 2"));
    }

    #[test]
    fn test_attributes_decoded_and_raw_retained() {
        let doc = parse("<a title=\"x &amp; y\"/>").unwrap();
        let root = doc.root_element().unwrap();
        let el = doc.node(root).unwrap().as_element().unwrap();
        let attr = el.attribute("title").unwrap();
        assert_eq!(attr.value, "x & y");
        assert_eq!(attr.raw_value.as_deref(), Some("x &amp; y"));
        assert!(!attr.modified);
    }

    #[test]
    fn test_declaration_and_doctype() {
        let doc = parse("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE r>\n<r/>").unwrap();
        assert_eq!(doc.xml_declaration(), Some("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert_eq!(doc.version(), Some("1.0"));
        assert_eq!(doc.encoding(), "utf-8");
        assert_eq!(doc.doctype(), Some("<!DOCTYPE r>"));
    }

    #[test]
    fn test_prolog_comment_and_pi() {
        let doc = parse("<!-- head --><?pi data?><r/>").unwrap();
        let kinds: Vec<_> = doc
            .children(DOCUMENT_NODE)
            .map(|id| doc.node(id).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Comment, NodeKind::ProcessingInstruction, NodeKind::Element]
        );
    }

    #[test]
    fn test_parsed_tree_is_pristine() {
        let doc = parse("<r><a x=\"1\">text</a></r>").unwrap();
        for id in 0..doc.node_count() as NodeId {
            assert!(!doc.is_modified(id), "node {id} should be unmodified");
        }
    }

    #[test]
    fn test_mismatched_close_tag_fails() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("</a>"));
    }

    #[test]
    fn test_unclosed_element_fails() {
        assert!(matches!(parse("<a><b>"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_no_root_fails() {
        assert!(parse("").is_err());
        assert!(parse("<!-- only a comment -->").is_err());
        assert!(parse("   \n  ").is_err());
    }

    #[test]
    fn test_multiple_roots_fail() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_text_outside_root_fails() {
        assert!(parse("<a/>junk").is_err());
        assert!(parse("junk<a/>").is_err());
    }

    #[test]
    fn test_trailing_whitespace_kept() {
        let doc = parse("<a/>\n").unwrap();
        assert_eq!(doc.trailing_ws, "\n");
    }

    #[test]
    fn test_cdata_child() {
        let doc = parse("<a> <![CDATA[x<y]]></a>").unwrap();
        let root = doc.root_element().unwrap();
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children.len(), 2);
        let ws = doc.node(children[0]).unwrap().as_text().unwrap();
        assert_eq!(ws.content, " ");
        let cdata = doc.node(children[1]).unwrap().as_text().unwrap();
        assert!(cdata.cdata);
        assert_eq!(cdata.content, "x<y");
    }

    #[test]
    fn test_misplaced_declaration_fails() {
        assert!(parse("<r/><?xml version=\"1.0\"?>").is_err());
    }
}

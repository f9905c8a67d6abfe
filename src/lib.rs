//! lossless-xml - round-trip preserving XML parsing and editing.
//!
//! Parses XML into an editable tree that remembers how the source was
//! written: whitespace runs, attribute quote styles, entity spellings,
//! raw tag text. Serializing an untouched document reproduces the input
//! byte for byte; edits re-render only the regions they actually
//! changed, with formatting for new content inferred from the
//! surrounding document.
//!
//! ```
//! use lossless_xml::{Document, Editor};
//!
//! let doc = Document::parse("<deps>\n    <dep>a</dep>\n</deps>")?;
//! let mut editor = Editor::new(doc);
//! let root = editor.document().root_element().unwrap();
//! editor.add_element_with_text(root, "dep", "b")?;
//! assert_eq!(
//!     editor.to_xml(),
//!     "<deps>\n    <dep>a</dep>\n    <dep>b</dep>\n</deps>"
//! );
//! # Ok::<(), lossless_xml::Error>(())
//! ```

mod config;
mod core;
mod dom;
mod editor;
mod error;
mod format;
mod serializer;

pub use config::{Config, QuoteStyle};
pub use dom::document::{Descendants, Document, DOCUMENT_NODE};
pub use dom::namespace::{
    attribute_qname, element_qname, resolve_prefix, split_qualified, QName, XMLNS_URI, XML_URI,
};
pub use dom::node::{
    Attribute, CommentData, ElementData, Node, NodeData, NodeId, NodeKind, PiData, TextData,
};
pub use editor::Editor;
pub use error::{Error, Result};
pub use format::detect_line_ending;
pub use serializer::Serializer;

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n\
        \x20   <!-- build deps -->\n\
        \x20   <dependencies>\n\
        \x20       <dependency>\n\
        \x20           <groupId>junit</groupId>\n\
        \x20           <artifactId>junit</artifactId>\n\
        \x20       </dependency>\n\
        \x20   </dependencies>\n\
        </project>\n";

    #[test]
    fn test_untouched_document_round_trips() {
        let mut doc = Document::parse(POM).unwrap();
        assert_eq!(Serializer::default().serialize(&mut doc), POM);
    }

    #[test]
    fn test_edit_touches_only_its_own_region() {
        let mut editor = Editor::parse(POM).unwrap();
        let doc = editor.document();
        let dep = doc
            .descendant_by_name(DOCUMENT_NODE, "dependency")
            .unwrap();
        editor.set_attribute(dep, "scope", "test").unwrap();

        let out = editor.to_xml();
        // The untouched regions are byte-identical, comment included.
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(out.contains("<!-- build deps -->"));
        assert!(out.contains("<groupId>junit</groupId>"));
        assert!(out.contains("<dependency scope=\"test\">"));
    }

    #[test]
    fn test_added_dependency_matches_sibling_formatting() {
        let mut editor = Editor::parse(POM).unwrap();
        let deps = editor
            .document()
            .descendant_by_name(DOCUMENT_NODE, "dependencies")
            .unwrap();
        let dep = editor.add_element(deps, "dependency").unwrap();
        editor.add_element_with_text(dep, "groupId", "org.slf4j").unwrap();

        let out = editor.to_xml();
        assert!(out.contains(
            "</dependency>\n        <dependency>\n            <groupId>org.slf4j</groupId>"
        ));
        // The original dependency block is untouched.
        assert!(out.contains("<dependency>\n            <groupId>junit</groupId>"));
    }

    #[test]
    fn test_serialize_then_edit_again() {
        let mut editor = Editor::parse("<a>\n  <b>1</b>\n</a>").unwrap();
        let b = editor
            .document()
            .descendant_by_name(DOCUMENT_NODE, "b")
            .unwrap();
        editor.set_text(b, "2").unwrap();
        assert_eq!(editor.to_xml(), "<a>\n  <b>2</b>\n</a>");
        // After serializing, the current state round-trips as pristine.
        assert_eq!(editor.to_xml(), "<a>\n  <b>2</b>\n</a>");
        editor.set_text(b, "3").unwrap();
        assert_eq!(editor.to_xml(), "<a>\n  <b>3</b>\n</a>");
    }

    #[test]
    fn test_comment_out_and_back() {
        let mut editor =
            Editor::parse("<deps>\n    <dep scope='x'>v</dep>\n    <keep/>\n</deps>").unwrap();
        let root = editor.document().root_element().unwrap();
        let dep = editor.document().child_by_name(root, "dep").unwrap();
        let comment = editor.comment_out(dep).unwrap();
        let restored = editor.uncomment(comment).unwrap();
        assert_eq!(editor.document().attribute(restored, "scope"), Some("x"));
        assert_eq!(
            editor.to_xml(),
            "<deps>\n    <dep scope='x'>v</dep>\n    <keep/>\n</deps>"
        );
    }

    #[test]
    fn test_namespace_resolution_through_editor() {
        let doc = Document::parse(
            "<root xmlns=\"urn:d\" xmlns:x=\"urn:x\"><x:item/><plain/></root>",
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        let item = doc.child_by_name(root, "x:item").unwrap();
        let plain = doc.child_by_name(root, "plain").unwrap();
        assert_eq!(element_qname(&doc, item).unwrap().namespace_uri.as_deref(), Some("urn:x"));
        assert_eq!(element_qname(&doc, plain).unwrap().namespace_uri.as_deref(), Some("urn:d"));
    }

    #[test]
    fn test_crlf_documents() {
        let editor = Editor::parse("<r>\r\n  <a/>\r\n</r>").unwrap();
        assert_eq!(editor.detected_line_ending(), "\r\n");

        let mut editor = editor;
        let root = editor.document().root_element().unwrap();
        editor.add_element(root, "b").unwrap();
        // Sibling whitespace is reused verbatim, CRLF included.
        assert_eq!(editor.to_xml(), "<r>\r\n  <a/>\r\n  <b></b>\r\n</r>");
    }

    #[test]
    fn test_pretty_print_of_edited_document() {
        let mut editor = Editor::with_config(
            Document::parse("<a><b>1</b></a>").unwrap(),
            Config::pretty().with_indent_string("  "),
        );
        let root = editor.document().root_element().unwrap();
        editor.add_element_with_text(root, "c", "2").unwrap();
        assert_eq!(editor.to_xml(), "<a>\n  <b>1</b>\n  <c>2</c>\n</a>");
    }

    #[test]
    fn test_declaration_never_invented() {
        let mut editor = Editor::parse("<r><a/></r>").unwrap();
        let root = editor.document().root_element().unwrap();
        editor.add_element(root, "b").unwrap();
        let out = editor.to_xml();
        assert!(!out.contains("<?xml"));
        // A synthesized one is available on request.
        assert_eq!(
            editor.document().generate_xml_declaration(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>"
        );
    }

    #[test]
    fn test_parse_errors_carry_position() {
        let err = Document::parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let rendered = err.to_string();
        assert!(rendered.contains("parse error at byte"), "{rendered}");
    }
}

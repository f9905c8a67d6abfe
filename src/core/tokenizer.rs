//! Pull tokenizer producing whitespace-carrying lexical events.
//!
//! Every token records its byte offset and, where relevant, the exact raw
//! source span, so the tree builder can retain lexical fidelity. In-tag
//! whitespace (between attributes, before `>`/`/>`, inside close tags) is
//! captured structurally; the raw tag text additionally preserves any
//! spacing around `=` for byte-exact reuse.

use crate::config::QuoteStyle;
use crate::core::scanner::Scanner;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// Whitespace between the previous token in the tag and this name.
    pub preceding_ws: &'a str,
    pub name: &'a str,
    /// Undecoded value, exactly as written between the quotes.
    pub raw_value: &'a str,
    pub quote: QuoteStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    XmlDecl {
        raw: &'a str,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    Doctype {
        raw: &'a str,
    },
    StartTag {
        name: &'a str,
        attributes: Vec<RawAttribute<'a>>,
        /// Whitespace between the last attribute (or name) and `>`/`/>`.
        open_ws: &'a str,
        self_closing: bool,
        raw: &'a str,
    },
    EndTag {
        name: &'a str,
        /// Whitespace between `</` and the name.
        close_ws: &'a str,
        raw: &'a str,
    },
    /// Character data run, undecoded.
    Text {
        raw: &'a str,
    },
    CData {
        text: &'a str,
        raw: &'a str,
    },
    Comment {
        text: &'a str,
    },
    Pi {
        target: &'a str,
        data: &'a str,
        raw: &'a str,
    },
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the token start (after BOM stripping).
    pub pos: usize,
}

pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    bom: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let (input, bom) = match input.strip_prefix('\u{FEFF}') {
            Some(stripped) => (stripped, true),
            None => (input, false),
        };
        Tokenizer {
            scanner: Scanner::new(input),
            bom,
            done: false,
        }
    }

    /// Whether the input carried a byte order mark.
    pub fn had_bom(&self) -> bool {
        self.bom
    }

    pub fn next_token(&mut self) -> Result<Token<'a>> {
        if self.done || self.scanner.is_eof() {
            self.done = true;
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: self.scanner.pos(),
            });
        }

        let pos = self.scanner.pos();
        let kind = if self.scanner.peek() == Some(b'<') {
            self.next_markup(pos)?
        } else {
            let raw = match self.scanner.take_until_byte(b'<') {
                Some(run) => run,
                None => {
                    let run = self.scanner.rest();
                    while self.scanner.advance().is_some() {}
                    run
                }
            };
            TokenKind::Text { raw }
        };
        log::trace!(target: "lossless_xml.tokenizer", "token at {pos}: {kind:?}");
        Ok(Token { kind, pos })
    }

    fn next_markup(&mut self, pos: usize) -> Result<TokenKind<'a>> {
        if self.scanner.eat("<!--") {
            let text = self
                .scanner
                .take_until("-->")
                .ok_or_else(|| Error::parse("unterminated comment", pos))?;
            return Ok(TokenKind::Comment { text });
        }
        if self.scanner.starts_with("<![CDATA[") {
            self.scanner.eat("<![CDATA[");
            let text = self
                .scanner
                .take_until("]]>")
                .ok_or_else(|| Error::parse("unterminated CDATA section", pos))?;
            let raw = self.scanner.slice(pos, self.scanner.pos());
            return Ok(TokenKind::CData { text, raw });
        }
        if self.scanner.starts_with("<!DOCTYPE") {
            return self.doctype(pos);
        }
        if self.scanner.starts_with("<?") {
            return self.processing_instruction(pos);
        }
        if self.scanner.starts_with("</") {
            return self.end_tag(pos);
        }
        if self.scanner.starts_with("<!") {
            return Err(Error::parse("unrecognized markup declaration", pos));
        }
        self.start_tag(pos)
    }

    fn start_tag(&mut self, pos: usize) -> Result<TokenKind<'a>> {
        self.scanner.advance(); // '<'
        let name = self.scanner.read_name();
        if name.is_empty() {
            return Err(Error::parse("invalid character in tag name", self.scanner.pos()));
        }

        let mut attributes = Vec::new();
        loop {
            let ws = self.scanner.skip_whitespace();
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.advance();
                    let raw = self.scanner.slice(pos, self.scanner.pos());
                    return Ok(TokenKind::StartTag {
                        name,
                        attributes,
                        open_ws: ws,
                        self_closing: false,
                        raw,
                    });
                }
                Some(b'/') => {
                    self.scanner.advance();
                    if self.scanner.peek() != Some(b'>') {
                        return Err(Error::parse("expected '>' after '/'", self.scanner.pos()));
                    }
                    self.scanner.advance();
                    let raw = self.scanner.slice(pos, self.scanner.pos());
                    return Ok(TokenKind::StartTag {
                        name,
                        attributes,
                        open_ws: ws,
                        self_closing: true,
                        raw,
                    });
                }
                Some(_) => attributes.push(self.attribute(ws)?),
                None => return Err(Error::parse(format!("unterminated tag <{name}"), pos)),
            }
        }
    }

    fn attribute(&mut self, preceding_ws: &'a str) -> Result<RawAttribute<'a>> {
        let name = self.scanner.read_name();
        if name.is_empty() {
            return Err(Error::parse("invalid attribute name", self.scanner.pos()));
        }
        self.scanner.skip_whitespace();
        if self.scanner.advance() != Some(b'=') {
            return Err(Error::parse(
                format!("expected '=' after attribute '{name}'"),
                self.scanner.pos(),
            ));
        }
        self.scanner.skip_whitespace();
        let quote = match self.scanner.advance() {
            Some(b'"') => QuoteStyle::Double,
            Some(b'\'') => QuoteStyle::Single,
            _ => {
                return Err(Error::parse(
                    format!("attribute '{name}' value must be quoted"),
                    self.scanner.pos(),
                ))
            }
        };
        let raw_value = self
            .scanner
            .take_until_byte(quote.as_char() as u8)
            .ok_or_else(|| {
                Error::parse(format!("unterminated value for attribute '{name}'"), self.scanner.pos())
            })?;
        self.scanner.advance(); // closing quote
        Ok(RawAttribute {
            preceding_ws,
            name,
            raw_value,
            quote,
        })
    }

    fn end_tag(&mut self, pos: usize) -> Result<TokenKind<'a>> {
        self.scanner.eat("</");
        let close_ws = self.scanner.skip_whitespace();
        let name = self.scanner.read_name();
        if name.is_empty() {
            return Err(Error::parse("invalid character in closing tag", self.scanner.pos()));
        }
        self.scanner.skip_whitespace();
        if self.scanner.advance() != Some(b'>') {
            return Err(Error::parse(format!("unterminated closing tag </{name}"), pos));
        }
        let raw = self.scanner.slice(pos, self.scanner.pos());
        Ok(TokenKind::EndTag { name, close_ws, raw })
    }

    fn processing_instruction(&mut self, pos: usize) -> Result<TokenKind<'a>> {
        self.scanner.eat("<?");
        let target = self.scanner.read_name();
        if target.is_empty() {
            return Err(Error::parse("invalid processing instruction target", pos));
        }
        let body = self
            .scanner
            .take_until("?>")
            .ok_or_else(|| Error::parse("unterminated processing instruction", pos))?;
        let raw = self.scanner.slice(pos, self.scanner.pos());

        if target.eq_ignore_ascii_case("xml") {
            let (version, encoding, standalone) = parse_declaration_attrs(body, pos)?;
            return Ok(TokenKind::XmlDecl {
                raw,
                version,
                encoding,
                standalone,
            });
        }
        // Data starts after the whitespace separating it from the target.
        let data = body.trim_start_matches(|c: char| c.is_ascii_whitespace());
        Ok(TokenKind::Pi { target, data, raw })
    }

    /// DOCTYPE passthrough: bracket-aware (internal subset) and
    /// quote-aware, no interpretation of the content.
    fn doctype(&mut self, pos: usize) -> Result<TokenKind<'a>> {
        self.scanner.eat("<!DOCTYPE");
        let mut bracket_depth = 0usize;
        loop {
            match self.scanner.advance() {
                Some(b'>') if bracket_depth == 0 => break,
                Some(b'[') => bracket_depth += 1,
                Some(b']') => bracket_depth = bracket_depth.saturating_sub(1),
                Some(q @ (b'"' | b'\'')) => {
                    if self.scanner.take_until_byte(q).is_none() {
                        return Err(Error::parse("unterminated literal in DOCTYPE", pos));
                    }
                    self.scanner.advance();
                }
                Some(_) => {}
                None => return Err(Error::parse("unterminated DOCTYPE", pos)),
            }
        }
        let raw = self.scanner.slice(pos, self.scanner.pos());
        Ok(TokenKind::Doctype { raw })
    }
}

/// Parse the pseudo-attributes of an XML declaration body
/// (the text between `<?xml` and `?>`).
fn parse_declaration_attrs(
    body: &str,
    pos: usize,
) -> Result<(Option<String>, Option<String>, Option<bool>)> {
    let mut version = None;
    let mut encoding = None;
    let mut standalone = None;

    let mut scanner = Scanner::new(body);
    loop {
        scanner.skip_whitespace();
        if scanner.is_eof() {
            break;
        }
        let name = scanner.read_name();
        if name.is_empty() {
            return Err(Error::parse("malformed XML declaration", pos));
        }
        scanner.skip_whitespace();
        if scanner.advance() != Some(b'=') {
            return Err(Error::parse("malformed XML declaration", pos));
        }
        scanner.skip_whitespace();
        let quote = match scanner.advance() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(Error::parse("malformed XML declaration", pos)),
        };
        let value = scanner
            .take_until_byte(quote)
            .ok_or_else(|| Error::parse("malformed XML declaration", pos))?;
        scanner.advance();

        match name {
            "version" => version = Some(value.to_string()),
            "encoding" => encoding = Some(value.to_string()),
            "standalone" => standalone = Some(value == "yes"),
            _ => {}
        }
    }
    Ok((version, encoding, standalone))
}

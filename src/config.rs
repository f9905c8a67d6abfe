//! Serialization and inference settings.
//!
//! A `Config` is a plain value; the fluent `with_*` setters consume and
//! return it so presets can be adjusted inline. The default configuration
//! preserves everything the parser captured.

/// Quote character used around an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }

    pub fn from_char(c: char) -> Option<QuoteStyle> {
        match c {
            '"' => Some(QuoteStyle::Double),
            '\'' => Some(QuoteStyle::Single),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// One indentation unit for generated content and pretty-printing.
    pub indent_string: String,
    pub line_ending: String,
    /// Reuse captured whitespace and raw spans when rendering.
    pub whitespace_preservation: bool,
    /// Re-indent the whole document, ignoring captured whitespace.
    pub pretty_print: bool,
    pub comment_preservation: bool,
    pub pi_preservation: bool,
    /// Quote style for new attributes when the element gives no signal.
    pub default_quote_style: QuoteStyle,
    pub include_xml_declaration: bool,
}

impl Default for Config {
    /// Preserve everything; the round-trip configuration.
    fn default() -> Self {
        Config {
            indent_string: "    ".to_string(),
            line_ending: "\n".to_string(),
            whitespace_preservation: true,
            pretty_print: false,
            comment_preservation: true,
            pi_preservation: true,
            default_quote_style: QuoteStyle::Double,
            include_xml_declaration: true,
        }
    }
}

impl Config {
    /// Uniform re-indentation; comments and PIs kept.
    pub fn pretty() -> Self {
        Config {
            whitespace_preservation: false,
            pretty_print: true,
            ..Config::default()
        }
    }

    /// Smallest output: whitespace, comments, PIs and the declaration all
    /// dropped.
    pub fn minimal() -> Self {
        Config {
            whitespace_preservation: false,
            pretty_print: false,
            comment_preservation: false,
            pi_preservation: false,
            include_xml_declaration: false,
            ..Config::default()
        }
    }

    pub fn with_indent_string(mut self, indent: impl Into<String>) -> Self {
        self.indent_string = indent.into();
        self
    }

    pub fn with_line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    pub fn with_whitespace_preservation(mut self, on: bool) -> Self {
        self.whitespace_preservation = on;
        self
    }

    pub fn with_pretty_print(mut self, on: bool) -> Self {
        self.pretty_print = on;
        self
    }

    pub fn with_comment_preservation(mut self, on: bool) -> Self {
        self.comment_preservation = on;
        self
    }

    pub fn with_pi_preservation(mut self, on: bool) -> Self {
        self.pi_preservation = on;
        self
    }

    pub fn with_default_quote_style(mut self, quote: QuoteStyle) -> Self {
        self.default_quote_style = quote;
        self
    }

    pub fn with_include_xml_declaration(mut self, on: bool) -> Self {
        self.include_xml_declaration = on;
        self
    }
}

//! Low-level byte cursor over decoded text.
//!
//! The scanner works on the UTF-8 bytes of a `&str` and uses memchr for
//! delimiter search. All delimiters it looks for are ASCII, so every
//! slice it hands back falls on a character boundary; bytes >= 0x80 are
//! treated as name bytes and pass through untouched.

use memchr::memchr;

pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    /// Consume `prefix` if the input continues with it.
    #[inline]
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Skip XML whitespace, returning the span skipped.
    #[inline]
    pub fn skip_whitespace(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    /// Read an XML name. An empty result means the cursor was not on a
    /// name start character.
    #[inline]
    pub fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        if let Some(b) = self.peek() {
            if is_name_start_byte(b) {
                self.pos += 1;
                while let Some(b) = self.peek() {
                    if is_name_byte(b) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }
        &self.input[start..self.pos]
    }

    /// Advance to the next occurrence of `byte`, returning the text in
    /// between. The cursor ends up on the delimiter.
    #[inline]
    pub fn take_until_byte(&mut self, byte: u8) -> Option<&'a str> {
        let start = self.pos;
        let offset = memchr(byte, &self.bytes()[start..])?;
        self.pos = start + offset;
        Some(&self.input[start..self.pos])
    }

    /// Advance past a multi-byte delimiter such as `-->` or `]]>`,
    /// returning the text before it.
    pub fn take_until(&mut self, delim: &str) -> Option<&'a str> {
        let start = self.pos;
        let offset = find_substr(&self.bytes()[start..], delim.as_bytes())?;
        let end = start + offset;
        self.pos = end + delim.len();
        Some(&self.input[start..end])
    }

    /// Slice of the original input.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

fn find_substr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let first = needle[0];
    let mut offset = 0;
    while let Some(found) = memchr(first, &haystack[offset..]) {
        let at = offset + found;
        if haystack[at..].starts_with(needle) {
            return Some(at);
        }
        offset = at + 1;
    }
    None
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
pub fn is_name_start_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

//! Entity decoding and encoding.
//!
//! Decoding borrows when the input has no `&` at all (the common case);
//! unrecognized or malformed references pass through verbatim so that no
//! information is lost.

use std::borrow::Cow;

use memchr::{memchr, memchr2, memchr3};

/// Decode the five named entities and numeric character references.
pub fn decode(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let first = match memchr(b'&', bytes) {
        Some(pos) => pos,
        None => return Cow::Borrowed(input),
    };

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first]);
    let mut pos = first;

    while pos < input.len() {
        match memchr(b'&', &bytes[pos..]) {
            Some(offset) => {
                let amp = pos + offset;
                out.push_str(&input[pos..amp]);
                match decode_entity(&input[amp..]) {
                    Some((ch, len)) => {
                        out.push(ch);
                        pos = amp + len;
                    }
                    None => {
                        out.push('&');
                        pos = amp + 1;
                    }
                }
            }
            None => {
                out.push_str(&input[pos..]);
                break;
            }
        }
    }

    Cow::Owned(out)
}

/// Decode one entity reference starting at `&`. Returns the decoded char
/// and the byte length of the reference including `&` and `;`.
fn decode_entity(input: &str) -> Option<(char, usize)> {
    let semi = memchr(b';', &input.as_bytes()[..input.len().min(16)])?;
    let body = &input[1..semi];
    let len = semi + 1;
    let ch = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, len))
}

/// Encode text content: `&`, `<` and `>` become entities.
pub fn encode_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Encode an attribute value for the given quote character. Only the
/// active quote needs escaping, plus `&` and `<`.
pub fn encode_attribute(input: &str, quote: char) -> Cow<'_, str> {
    let quote_byte = quote as u8;
    if memchr2(b'&', b'<', input.as_bytes()).is_none()
        && memchr(quote_byte, input.as_bytes()).is_none()
    {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

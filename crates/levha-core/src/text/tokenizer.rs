//! Content-stream string tokenizer.
//!
//! Pulls parenthesized literal strings and `<hex>` strings out of a page
//! content stream without interpreting any operators.

use lazy_static::lazy_static;
use regex::bytes::Regex;

use super::decoder::{decode_hex, decode_literal};

lazy_static! {
    static ref HEX_STRING: Regex = Regex::new(r"<([0-9A-Fa-f]+)>").unwrap();
}

/// Raw string tokens of one page, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTokens {
    /// Literal payloads with escapes still in place, outer parens removed.
    pub literals: Vec<Vec<u8>>,
    /// Hex payloads (digits only).
    pub hex: Vec<String>,
}

impl PageTokens {
    /// Decode every token into page text.
    ///
    /// Each decoded literal is followed by a newline, then each non-empty hex
    /// string.
    pub fn decode(&self) -> String {
        let mut out = String::new();
        for literal in &self.literals {
            out.push_str(&decode_literal(literal));
            out.push('\n');
        }
        for hex in &self.hex {
            let decoded = decode_hex(hex);
            if !decoded.is_empty() {
                out.push_str(&decoded);
                out.push('\n');
            }
        }
        out
    }
}

/// Tokenize one page's content stream.
pub fn tokenize(content: &[u8]) -> PageTokens {
    let mut tokens = PageTokens::default();

    let mut i = 0;
    while i < content.len() {
        if content[i] == b'(' {
            match read_literal(content, i) {
                Some((payload, end)) => {
                    tokens.literals.push(payload);
                    i = end;
                }
                // Unterminated: nothing after it can close a token either.
                None => break,
            }
        } else {
            i += 1;
        }
    }

    tokens.hex = HEX_STRING
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect();

    tokens
}

/// Read one balanced literal starting at `start` (which must be `(`).
///
/// Returns the payload and the index just past the closing paren.
fn read_literal(content: &[u8], start: usize) -> Option<(Vec<u8>, usize)> {
    let mut payload = Vec::new();
    let mut depth = 0usize;
    let mut i = start;

    while i < content.len() {
        let byte = content[i];
        if byte == b'\\' && i + 1 < content.len() {
            payload.push(byte);
            payload.push(content[i + 1]);
            i += 2;
            continue;
        }
        match byte {
            b'(' => {
                depth += 1;
                if depth > 1 {
                    payload.push(byte);
                }
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((payload, i + 1));
                }
                payload.push(byte);
            }
            _ => payload.push(byte),
        }
        i += 1;
    }

    None
}

/// Tokenize and decode a full page in one step.
pub fn page_text(content: &[u8]) -> String {
    tokenize(content).decode()
}

//! String token decoding.
//!
//! Literal strings carry PDF escape sequences; hex strings are either
//! UTF-16BE or single-byte. Anything outside ASCII in a single-byte string is
//! read as Windows-1254 (Turkish).

use encoding_rs::{UTF_16BE, WINDOWS_1254};

/// Decode a literal string payload (outer parens removed, escapes intact).
pub fn decode_literal(raw: &[u8]) -> String {
    let bytes = unescape(raw);
    decode_single_byte(&bytes)
}

/// Resolve PDF literal escapes into raw bytes.
///
/// Octal escapes of one to three digits produce a single byte. Unknown
/// escapes emit the escaped character itself.
pub fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let byte = raw[i];
        if byte != b'\\' || i + 1 >= raw.len() {
            out.push(byte);
            i += 1;
            continue;
        }

        let next = raw[i + 1];
        i += 2;
        match next {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'(' | b')' | b'\\' => out.push(next),
            b'0'..=b'7' => {
                let mut value = u32::from(next - b'0');
                let mut digits = 1;
                while digits < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    value = value * 8 + u32::from(raw[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.push(other),
        }
    }

    out
}

/// Decode a hex string payload.
pub fn decode_hex(hex: &str) -> String {
    let bytes = hex_bytes(hex);
    if bytes.is_empty() {
        return String::new();
    }

    let decoded = if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        UTF_16BE
            .decode_without_bom_handling(&bytes[2..])
            .0
            .into_owned()
    } else if looks_like_utf16(&bytes) {
        UTF_16BE.decode_without_bom_handling(&bytes).0.into_owned()
    } else {
        decode_single_byte(&bytes)
    };

    strip_controls(&decoded)
}

/// Parse hex digits into bytes; an odd trailing digit is padded with `0`.
fn hex_bytes(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter_map(|b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();

    digits
        .chunks(2)
        .map(|pair| {
            let high = pair[0];
            let low = pair.get(1).copied().unwrap_or(0);
            (high << 4) | low
        })
        .collect()
}

/// Zero bytes at even offsets are the high half of BMP Latin characters.
fn looks_like_utf16(bytes: &[u8]) -> bool {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }
    let zeros = bytes.iter().step_by(2).filter(|&&b| b == 0).count();
    zeros > bytes.len() / 4
}

/// ASCII stays as is; any high byte switches the whole string to Windows-1254.
fn decode_single_byte(bytes: &[u8]) -> String {
    if bytes.iter().any(|&b| b >= 0x80) {
        WINDOWS_1254
            .decode_without_bom_handling(bytes)
            .0
            .into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn strip_controls(s: &str) -> String {
    s.chars()
        .filter(|&c| c >= ' ' || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_escapes() {
        assert_eq!(decode_literal(br"a\nb\tc\(d\)\\"), "a\nb\tc(d)\\");
    }

    #[test]
    fn test_octal_escapes_are_bytes() {
        assert_eq!(unescape(br"\101\12x"), vec![b'A', b'\n', b'x']);
        // 0xDD is İ in Windows-1254
        assert_eq!(decode_literal(br"\335\336"), "İŞ");
    }

    #[test]
    fn test_unknown_escape_keeps_char() {
        assert_eq!(decode_literal(br"\q"), "q");
    }

    #[test]
    fn test_turkish_code_page() {
        let raw = [0x4D, 0xDC, 0x4B, 0x45, 0x4C, 0x4C, 0x45, 0x46, 0xDD, 0x4E];
        assert_eq!(decode_literal(&raw), "MÜKELLEFİN");
        assert_eq!(decode_literal(&[0xFD, 0xFE, 0xF0, 0xE7, 0xF6, 0xFC]), "ışğçöü");
    }

    #[test]
    fn test_hex_with_bom_is_utf16() {
        assert_eq!(decode_hex("FEFF0130015F"), "İş");
    }

    #[test]
    fn test_hex_utf16_without_bom() {
        assert_eq!(decode_hex("00560044"), "VD");
    }

    #[test]
    fn test_hex_single_byte() {
        assert_eq!(decode_hex("41DD"), "Aİ");
    }

    #[test]
    fn test_hex_odd_length_padded() {
        assert_eq!(decode_hex("414"), "A@");
    }

    #[test]
    fn test_hex_drops_controls() {
        assert_eq!(decode_hex("41014209"), "AB\t");
    }
}

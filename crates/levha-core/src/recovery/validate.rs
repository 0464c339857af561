//! Tax identifier validation and candidate search.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER_RUN: Regex = Regex::new(r"[1-9]\d{9}").unwrap();
    static ref SMALL_NUMBER: Regex = Regex::new(r"\b(\d{1,4})\b").unwrap();
    static ref ADDRESS_NUMBER_PATTERNS: Vec<Regex> = [
        r"(?i)NO\s*:\s*\d",
        r"(?i)KAPI\s*NO",
        r"(?i)SK\.\s*NO",
        r"(?i)MAH\.\s*\d",
        r"(?i)CAD\.\s*NO",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// Length of a tax identifier.
pub const IDENTIFIER_LEN: usize = 10;

/// Structural check: 10 ASCII digits, non-zero first digit, not date-like.
pub fn is_valid_identifier(candidate: &str) -> bool {
    candidate.len() == IDENTIFIER_LEN
        && candidate.bytes().all(|b| b.is_ascii_digit())
        && !candidate.starts_with('0')
        && !looks_like_date(candidate)
}

/// True when the leading eight digits read as DDMMYYYY or YYYYMMDD.
pub fn looks_like_date(candidate: &str) -> bool {
    if candidate.len() != IDENTIFIER_LEN || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let part = |range: std::ops::Range<usize>| candidate[range].parse::<u32>().unwrap_or(0);

    let day_first = is_day(part(0..2)) && is_month(part(2..4)) && is_year(part(4..8));
    let year_first = is_year(part(0..4)) && is_month(part(4..6)) && is_day(part(6..8));
    day_first || year_first
}

fn is_day(value: u32) -> bool {
    (1..=31).contains(&value)
}

fn is_month(value: u32) -> bool {
    (1..=12).contains(&value)
}

fn is_year(value: u32) -> bool {
    (1900..=2100).contains(&value)
}

/// More than two thirds of adjacent digit pairs step by -1, 0 or +1.
pub fn is_sequential(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() < 5 {
        return false;
    }
    let steps = bytes
        .windows(2)
        .filter(|pair| (i16::from(pair[1]) - i16::from(pair[0])).abs() <= 1)
        .count();
    steps > bytes.len() * 2 / 3
}

/// True when the candidate can be assembled from small address numbers in
/// `text`, e.g. "858 SK. NO: 9 İÇ KAPI NO: 706" for "8589706...".
pub fn looks_like_address_number(candidate: &str, text: &str) -> bool {
    let pattern_hits = ADDRESS_NUMBER_PATTERNS
        .iter()
        .filter(|re| re.is_match(text))
        .count();
    if pattern_hits < 2 {
        return false;
    }

    let mut joined = String::new();
    let mut prefix_hits = 0;
    for number in SMALL_NUMBER.find_iter(text) {
        joined.push_str(number.as_str());
        if candidate.starts_with(&joined) {
            prefix_hits += 1;
        }
        if joined.len() >= IDENTIFIER_LEN {
            break;
        }
    }

    let n = joined.len().min(IDENTIFIER_LEN).min(candidate.len());
    prefix_hits >= 3 && joined[..n] == candidate[..n]
}

/// Decode hex byte pairs, keeping bytes that are ASCII digits.
pub fn hex_to_digits(hex: &str) -> String {
    hex.as_bytes()
        .chunks_exact(2)
        .filter_map(|pair| {
            let byte = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
            byte.is_ascii_digit().then_some(char::from(byte))
        })
        .collect()
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Identifier from decoded barcode text.
///
/// First validated run in the text, else the first validated window over the
/// text's digits alone.
pub fn identifier_from_text(text: &str) -> Option<String> {
    IDENTIFIER_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| is_valid_identifier(run))
        .map(str::to_string)
        .or_else(|| {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            identifier_from_digits(&digits)
        })
}

/// Identifier from a glyph digit string: the first validated ten-digit window.
pub fn identifier_from_digits(digits: &str) -> Option<String> {
    digits
        .as_bytes()
        .windows(IDENTIFIER_LEN)
        .filter_map(|window| std::str::from_utf8(window).ok())
        .find(|window| is_valid_identifier(window))
        .map(str::to_string)
}

/// Stricter acceptance used for text and raw-byte candidates.
pub fn is_plausible_identifier(candidate: &str, context: &str) -> bool {
    is_valid_identifier(candidate)
        && !is_sequential(candidate)
        && !looks_like_address_number(candidate, context)
}

//! Text normalization and Turkish-aware comparison helpers.

/// Normalize decoded document text.
///
/// Line endings become `\n`, no-break spaces become plain spaces, and other
/// control characters (except tab) are removed.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{202F}' => Some(' '),
            '\n' | '\t' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Fold a string for Turkish-insensitive comparison.
///
/// Lowercases, maps dotted/dotless i and the Turkish diacritics to their ASCII
/// base letters, and drops combining dots.
pub fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'İ' | 'I' | 'ı' => out.push('i'),
            'Ş' | 'ş' => out.push('s'),
            'Ğ' | 'ğ' => out.push('g'),
            'Ü' | 'ü' => out.push('u'),
            'Ö' | 'ö' => out.push('o'),
            'Ç' | 'ç' => out.push('c'),
            '\u{0307}' => {}
            other => out.extend(other.to_lowercase()),
        }
    }
    out
}

/// Whether `haystack` contains any of `needles` after folding.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let folded = fold(haystack);
    needles.iter().any(|n| folded.contains(&fold(n)))
}

/// Whether every character is an ASCII digit (and there is at least one).
pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

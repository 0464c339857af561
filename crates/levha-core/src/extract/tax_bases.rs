//! Historical tax base (matrah) extraction.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::TAX_BASE;
use super::tax_types::line_tax_type;
use super::FieldExtractor;
use crate::models::config::ExtractionConfig;
use crate::models::TaxBaseEntry;
use crate::text::fold;

/// Extracts `<year> [yılı] <amount> [TL]` rows.
#[derive(Debug, Clone)]
pub struct TaxBaseExtractor {
    floor: Decimal,
    min_year: i32,
    max_year: i32,
}

impl TaxBaseExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            floor: Decimal::from(config.tax_base_floor),
            min_year: config.min_tax_base_year,
            max_year: config.max_tax_base_year,
        }
    }

    /// Drop entries at or below the floor.
    pub fn apply_floor(&self, bases: Vec<TaxBaseEntry>) -> Vec<TaxBaseEntry> {
        bases.into_iter().filter(|b| b.amount > self.floor).collect()
    }
}

impl Default for TaxBaseExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl FieldExtractor for TaxBaseExtractor {
    type Output = TaxBaseEntry;

    fn extract_all(&self, text: &str) -> Vec<TaxBaseEntry> {
        let folded = fold(text);
        if folded.contains("matrahsiz") {
            debug!("Document declares no tax base");
            return Vec::new();
        }

        let mut bases = Vec::new();
        for line in text.lines() {
            for caps in TAX_BASE.captures_iter(line) {
                let year: i32 = caps[1].parse().unwrap_or(0);
                if year < self.min_year || year > self.max_year {
                    continue;
                }
                let Some(amount) = parse_turkish_amount(&caps[3]) else {
                    continue;
                };
                if amount <= self.floor {
                    continue;
                }

                let mut entry = TaxBaseEntry::new(year, amount);
                entry.period = caps.get(2).map(|p| format!("{}. Dönem", p.as_str()));
                if let Some(m) = caps.get(0) {
                    entry.kind = line_tax_type(&line[m.end()..]).map(|t| t.display().to_string());
                }
                bases.push(entry);
            }
        }

        // New businesses list placeholder rows; keep only real amounts.
        if folded.contains("yeni ise baslama") {
            bases = self.apply_floor(bases);
        }

        bases
    }
}

/// Extract tax bases with default settings.
pub fn extract_tax_bases(text: &str) -> Vec<TaxBaseEntry> {
    TaxBaseExtractor::default().extract_all(text)
}

/// Parse a Turkish-formatted amount ("1.234.567,89").
///
/// The last separator is decimal only when exactly two digits follow it;
/// every other separator groups thousands.
pub fn parse_turkish_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (integer, fraction) = match s.rfind(|c: char| c == '.' || c == ',') {
        Some(pos) if s.len() - pos - 1 == 2 => (&s[..pos], Some(&s[pos + 1..])),
        _ => (s, None),
    };

    let mut normalized: String = integer.chars().filter(|c| c.is_ascii_digit()).collect();
    if normalized.is_empty() {
        return None;
    }
    if let Some(fraction) = fraction {
        normalized.push('.');
        normalized.push_str(fraction);
    }

    Decimal::from_str(&normalized).ok()
}

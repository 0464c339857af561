//! Tax type detection.

use super::FieldExtractor;
use crate::models::TaxType;
use crate::text::fold;

/// Folded phrases per tax type, in detection order.
const TAX_TYPE_PHRASES: &[(&str, TaxType)] = &[
    ("yillik gelir vergisi", TaxType::AnnualIncomeTax),
    ("kurumlar vergisi", TaxType::CorporateTax),
    ("katma deger vergisi", TaxType::ValueAddedTax),
    ("gecici vergi", TaxType::ProvisionalTax),
    ("damga vergisi", TaxType::StampDuty),
    ("muhtasar", TaxType::Withholding),
    ("stopaj", TaxType::Stoppage),
    ("bag-kur", TaxType::BagKur),
    ("sgk", TaxType::SocialSecurity),
    ("kdv", TaxType::Kdv),
    ("gelir vergisi", TaxType::IncomeTax),
];

/// Detects every tax type mentioned in the text.
#[derive(Debug, Default)]
pub struct TaxTypeExtractor;

impl TaxTypeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for TaxTypeExtractor {
    type Output = TaxType;

    fn extract_all(&self, text: &str) -> Vec<TaxType> {
        let folded = fold(text);
        let mut found: Vec<(usize, TaxType)> = Vec::new();

        for &(phrase, tax_type) in TAX_TYPE_PHRASES {
            // "Gelir Vergisi" is part of "Yıllık Gelir Vergisi"
            if tax_type == TaxType::IncomeTax
                && found.iter().any(|(_, t)| *t == TaxType::AnnualIncomeTax)
            {
                continue;
            }
            if let Some(pos) = folded.find(phrase) {
                found.push((pos, tax_type));
            }
        }

        // Report in order of first appearance
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, tax_type)| tax_type).collect()
    }
}

/// Detect tax types in the text.
pub fn extract_tax_types(text: &str) -> Vec<TaxType> {
    TaxTypeExtractor::new().extract_all(text)
}

/// First tax type mentioned on a single line, for qualifying tax bases.
pub(crate) fn line_tax_type(line: &str) -> Option<TaxType> {
    let folded = fold(line);
    TAX_TYPE_PHRASES
        .iter()
        .find(|(phrase, _)| folded.contains(phrase))
        .map(|&(_, tax_type)| tax_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_income_tax_and_kdv() {
        assert_eq!(
            extract_tax_types("Gelir Vergisi ve KDV"),
            vec![TaxType::IncomeTax, TaxType::Kdv]
        );
    }

    #[test]
    fn test_annual_income_suppresses_generic() {
        assert_eq!(
            extract_tax_types("YILLIK GELİR VERGİSİ\nKATMA DEĞER VERGİSİ"),
            vec![TaxType::AnnualIncomeTax, TaxType::ValueAddedTax]
        );
    }

    #[test]
    fn test_corporate_and_ascii_variants() {
        assert_eq!(
            extract_tax_types("Kurumlar Vergisi, Gecici Vergi, Bag-Kur"),
            vec![TaxType::CorporateTax, TaxType::ProvisionalTax, TaxType::BagKur]
        );
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_tax_types("ABC").is_empty());
    }
}

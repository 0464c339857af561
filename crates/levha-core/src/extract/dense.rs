//! Extraction from plates whose text collapsed into one long line.

use super::patterns::{
    DATE_DOTTED, DENSE_ADDRESS, DENSE_ADDRESS_END, DENSE_NAME, DENSE_TAX_OFFICE, TITLE_MARKERS,
};
use super::{dates::parse_date, DocumentText, Strategy};
use crate::models::DocumentRecord;
use crate::text::contains_any;

/// Pattern matching over the flattened text of a recognized tax plate.
#[derive(Debug, Default)]
pub struct DenseStrategy;

impl Strategy for DenseStrategy {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn applies(&self, _record: &DocumentRecord, text: &DocumentText) -> bool {
        contains_any(text.as_str(), TITLE_MARKERS)
    }

    fn extract(&self, text: &DocumentText) -> DocumentRecord {
        let text = text.as_str();
        let mut record = DocumentRecord::new();

        if let Some(caps) = DENSE_NAME.captures(text) {
            let name = caps[1].trim();
            if name.chars().count() > 3 {
                record.personal_name = Some(name.to_string());
            }
        }

        if let Some(caps) = DENSE_ADDRESS.captures(text) {
            let address = &caps[1];
            let address = match DENSE_ADDRESS_END.find(address) {
                Some(m) => &address[..m.start()],
                None => address,
            }
            .trim();
            if address.chars().count() > 20 {
                record.business_address = Some(address.to_string());
            }
        }

        if let Some(caps) = DENSE_TAX_OFFICE.captures(text) {
            record.tax_office = Some(caps[1].to_string());
        }

        record.start_date = DATE_DOTTED
            .find(text)
            .and_then(|m| parse_date(m.as_str()));

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const DENSE: &str = "T.C. GELİR İDARESİ BAŞKANLIĞI VERGİ LEVHASI MÜKELLEFİN AYŞE DEMİR \
        BOSTANCI MAH. BAĞDAT CAD. NO:10 KADIKÖY İSTANBUL YILLIK GELİR VERGİSİ KADIKÖY \
        12345678901 01.03.2018 477101 - GİYİM EŞYASI PERAKENDE TAKVİM YILI";

    #[test]
    fn test_dense_fields() {
        let record = DenseStrategy.extract(&DocumentText::new(DENSE));

        assert_eq!(record.personal_name.as_deref(), Some("AYŞE DEMİR"));
        assert_eq!(
            record.business_address.as_deref(),
            Some("BOSTANCI MAH. BAĞDAT CAD. NO:10 KADIKÖY İSTANBUL")
        );
        assert_eq!(record.tax_office.as_deref(), Some("KADIKÖY"));
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2018, 3, 1));
    }

    #[test]
    fn test_requires_title_marker() {
        let text = DocumentText::new("MÜKELLEFİN AYŞE DEMİR BOSTANCI MAH. X");
        let record = DenseStrategy.apply(DocumentRecord::new(), &text);
        assert!(record.is_empty());
    }
}

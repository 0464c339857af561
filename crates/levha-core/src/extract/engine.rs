//! Field extraction engine.

use tracing::{debug, trace};

use super::dense::DenseStrategy;
use super::keywords::KeywordLineStrategy;
use super::labeled::LabeledStrategy;
use super::patterns::{LABEL_VOCABULARY, NAME_LABELS, ORGANIZATION_LABELS};
use super::structural::StructuralStrategy;
use super::{
    ActivityExtractor, DocumentText, FieldExtractor, Strategy, TaxBaseExtractor, TaxTypeExtractor,
};
use crate::assembly::resolve_taxpayer_kind;
use crate::models::config::ExtractionConfig;
use crate::models::DocumentRecord;
use crate::text::contains_any;

/// Runs the layout strategies, reconciliation and list-field detectors.
pub struct FieldExtractionEngine {
    config: ExtractionConfig,
    strategies: Vec<Box<dyn Strategy>>,
}

impl FieldExtractionEngine {
    /// Create an engine with the standard strategy order.
    pub fn new(config: ExtractionConfig) -> Self {
        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(LabeledStrategy),
            Box::new(StructuralStrategy),
            Box::new(DenseStrategy),
        ];
        if config.supplementary_line_scan {
            strategies.push(Box::new(KeywordLineStrategy));
        }
        Self { config, strategies }
    }

    /// Names of the strategies in run order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract a record from normalized text.
    pub fn extract(&self, text: &DocumentText) -> DocumentRecord {
        let mut record = DocumentRecord::new();
        for strategy in &self.strategies {
            record = strategy.apply(record, text);
            trace!(strategy = strategy.name(), "Applied strategy");
        }

        let mut record = reconcile_names(record, text);

        record.tax_types = TaxTypeExtractor::new().extract_all(text.as_str());
        for activity in ActivityExtractor::new().extract_all(text.as_str()) {
            record.push_activity(activity);
        }
        record.tax_bases = TaxBaseExtractor::new(&self.config).extract_all(text.as_str());

        resolve_taxpayer_kind(&mut record);

        debug!(
            "Extracted fields: name={}, tax_id={}, {} tax types, {} activities, {} tax bases",
            record.display_name().is_some(),
            record.tax_id.is_some(),
            record.tax_types.len(),
            record.activities.len(),
            record.tax_bases.len()
        );
        record
    }

    /// Normalize raw text and extract.
    pub fn extract_str(&self, raw: &str) -> DocumentRecord {
        self.extract(&DocumentText::new(raw))
    }
}

impl Default for FieldExtractionEngine {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

/// Drop leaked label text from the personal name and fall back to the line
/// after an "ADI SOYADI" label.
fn reconcile_names(mut record: DocumentRecord, text: &DocumentText) -> DocumentRecord {
    if let (Some(personal), Some(_)) = (&record.personal_name, &record.organization_name) {
        if contains_any(personal, ORGANIZATION_LABELS) {
            debug!("Clearing personal name containing organization label text");
            record.personal_name = None;
        }
    }

    if record.personal_name.is_none() && record.organization_name.is_none() {
        record.personal_name = name_after_label(text);
    }

    record
}

fn name_after_label(text: &DocumentText) -> Option<String> {
    let label = (0..text.lines().len()).find(|&i| contains_any(text.line(i), NAME_LABELS))?;
    (label + 1..label + 3)
        .map(|j| text.line(j))
        .find(|line| line.chars().count() > 3 && !contains_any(line, LABEL_VOCABULARY))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_individual_document() {
        let record = FieldExtractionEngine::default().extract_str(
            "Adı Soyadı: Ali Örnek\n\
             Vergi Kimlik No: 1234567890\n\
             Vergi Dairesi: Örnek VD\n",
        );
        assert_eq!(record.personal_name.as_deref(), Some("Ali Örnek"));
        assert_eq!(record.tax_id.as_deref(), Some("1234567890"));
        assert_eq!(record.tax_office.as_deref(), Some("Örnek VD"));
        assert!(record.organization_name.is_none());
    }

    #[test]
    fn test_corporate_tax_moves_name_to_organization() {
        let record = FieldExtractionEngine::default().extract_str(
            "Adı Soyadı: Örnek Yazılım\n\
             Kurumlar Vergisi\n",
        );
        assert_eq!(record.organization_name.as_deref(), Some("Örnek Yazılım"));
        assert!(record.personal_name.is_none());
        assert_eq!(record.tax_types, vec![TaxType::CorporateTax]);
    }

    #[test]
    fn test_labels_win_over_structure() {
        let record = FieldExtractionEngine::default().extract_str(
            "Vergi Dairesi: Kadıköy\n\
             MÜKELLEFİN\n\
             AHMET YILMAZ\n\
             MODA CAD. NO:1\n\
             GELİR VERGİSİ\n\
             ÜSKÜDAR\n",
        );
        assert_eq!(record.tax_office.as_deref(), Some("Kadıköy"));
        assert_eq!(record.personal_name.as_deref(), Some("AHMET YILMAZ"));
        assert_eq!(record.business_address.as_deref(), Some("MODA CAD. NO:1"));
    }

    #[test]
    fn test_leaked_label_clears_personal_name() {
        let record = FieldExtractionEngine::default().extract_str(
            "Adı Soyadı: TİCARET ÜNVANI\n\
             Ticaret Ünvanı: ÖRNEK LİMİTED ŞİRKETİ\n\
             Kurumlar Vergisi\n",
        );
        assert!(record.personal_name.is_none());
        assert_eq!(
            record.organization_name.as_deref(),
            Some("ÖRNEK LİMİTED ŞİRKETİ")
        );
    }

    #[test]
    fn test_leaked_label_yields_to_structural_organization() {
        let record = FieldExtractionEngine::default().extract_str(
            "Adı Soyadı: TİCARET ÜNVANI\n\
             MÜKELLEFİN\n\
             ABC GIDA LİMİTED ŞİRKETİ\n\
             ATATÜRK MAH. NO:3\n\
             KURUMLAR VERGİSİ\n",
        );
        assert!(record.personal_name.is_none());
        assert_eq!(
            record.organization_name.as_deref(),
            Some("ABC GIDA LİMİTED ŞİRKETİ")
        );
    }

    #[test]
    fn test_name_after_label_line() {
        let record = FieldExtractionEngine::default().extract_str(
            "ADI SOYADI\n\
             VERGİ KİMLİK NO\n\
             MEHMET KAYA\n",
        );
        assert_eq!(record.personal_name.as_deref(), Some("MEHMET KAYA"));
    }

    #[test]
    fn test_individual_with_both_names_keeps_personal() {
        let record = FieldExtractionEngine::default().extract_str(
            "Adı Soyadı: Ali Örnek\n\
             Ticaret Ünvanı: Örnek Kırtasiye\n\
             Gelir Vergisi\n",
        );
        assert_eq!(record.personal_name.as_deref(), Some("Ali Örnek"));
        assert!(record.organization_name.is_none());
    }

    #[test]
    fn test_empty_text_gives_empty_record() {
        assert!(FieldExtractionEngine::default().extract_str("").is_empty());
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            FieldExtractionEngine::default().strategy_names(),
            vec!["labeled", "structural", "dense", "keywords"]
        );
    }
}

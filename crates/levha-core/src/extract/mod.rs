//! Rule-based field extraction for tax plates.
//!
//! Layout strategies run in priority order and may only fill fields that are
//! still empty; detectors for list fields run over the whole text.

pub mod activities;
pub mod dates;
pub mod dense;
pub mod engine;
pub mod keywords;
pub mod labeled;
pub mod patterns;
pub mod structural;
pub mod tax_bases;
pub mod tax_types;

pub use activities::{extract_activities, ActivityExtractor};
pub use dates::parse_date;
pub use engine::FieldExtractionEngine;
pub use tax_bases::{extract_tax_bases, parse_turkish_amount, TaxBaseExtractor};
pub use tax_types::{extract_tax_types, TaxTypeExtractor};

use crate::models::DocumentRecord;
use crate::text::normalize;

/// Normalized document text with its lines.
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    text: String,
    lines: Vec<String>,
}

impl DocumentText {
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let lines = text.lines().map(str::to_string).collect();
        Self { text, lines }
    }

    /// Full normalized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lines of the normalized text, untrimmed.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Trimmed line at `index`, or `""` past the end.
    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map(|l| l.trim()).unwrap_or("")
    }
}

/// A layout strategy contributing partial findings.
pub trait Strategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the strategy should run on this text given what is known.
    fn applies(&self, _record: &DocumentRecord, _text: &DocumentText) -> bool {
        true
    }

    /// Findings for this text, independent of the current record.
    fn extract(&self, text: &DocumentText) -> DocumentRecord;

    /// Merge findings into `record` without overwriting populated fields.
    ///
    /// A personal name is only taken while both name fields are empty; the
    /// organization name fills its own field.
    fn apply(&self, record: DocumentRecord, text: &DocumentText) -> DocumentRecord {
        if !self.applies(&record, text) {
            return record;
        }
        let mut found = self.extract(text);
        if record.organization_name.is_some() {
            found.personal_name = None;
        }
        record.fill_from(found)
    }
}

/// Trait for field extractors over the whole text.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Extract all occurrences in document order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// First capture group of the first matching pattern, trimmed and non-empty.
pub(crate) fn first_capture(patterns: &[regex::Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(DocumentRecord);

    impl Strategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _text: &DocumentText) -> DocumentRecord {
            self.0.clone()
        }
    }

    #[test]
    fn test_document_text_lines() {
        let text = DocumentText::new("a\r\n  b  \n");
        assert_eq!(text.lines().len(), 2);
        assert_eq!(text.line(1), "b");
        assert_eq!(text.line(9), "");
    }

    #[test]
    fn test_later_strategy_fills_organization_name() {
        let record = DocumentRecord {
            personal_name: Some("Ali Örnek".to_string()),
            ..Default::default()
        };
        let later = Fixed(DocumentRecord {
            personal_name: Some("Veli Yılmaz".to_string()),
            organization_name: Some("ÖRNEK LİMİTED ŞİRKETİ".to_string()),
            tax_office: Some("Kadıköy".to_string()),
            ..Default::default()
        });

        let merged = later.apply(record, &DocumentText::default());
        assert_eq!(merged.personal_name.as_deref(), Some("Ali Örnek"));
        assert_eq!(merged.organization_name.as_deref(), Some("ÖRNEK LİMİTED ŞİRKETİ"));
        assert_eq!(merged.tax_office.as_deref(), Some("Kadıköy"));
    }

    #[test]
    fn test_personal_name_needs_both_slots_empty() {
        let record = DocumentRecord {
            organization_name: Some("ÖRNEK LİMİTED ŞİRKETİ".to_string()),
            ..Default::default()
        };
        let later = Fixed(DocumentRecord {
            personal_name: Some("Ali Örnek".to_string()),
            ..Default::default()
        });

        let merged = later.apply(record, &DocumentText::default());
        assert!(merged.personal_name.is_none());
    }
}

//! Colon-labeled field extraction ("Vergi Dairesi: ...").

use tracing::trace;

use super::dates::parse_date;
use super::patterns::{
    LABEL_ADDRESS, LABEL_NATIONAL_ID, LABEL_ORGANIZATION_NAME, LABEL_PERSONAL_NAME,
    LABEL_START_DATE, LABEL_TAX_ID, LABEL_TAX_OFFICE,
};
use super::{first_capture, DocumentText, Strategy};
use crate::models::DocumentRecord;

/// Reads values printed after their labels.
#[derive(Debug, Default)]
pub struct LabeledStrategy;

impl Strategy for LabeledStrategy {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn extract(&self, text: &DocumentText) -> DocumentRecord {
        let text = text.as_str();
        let record = DocumentRecord {
            personal_name: first_capture(&LABEL_PERSONAL_NAME, text),
            organization_name: first_capture(&LABEL_ORGANIZATION_NAME, text),
            business_address: first_capture(&LABEL_ADDRESS, text),
            tax_office: first_capture(&LABEL_TAX_OFFICE, text),
            tax_id: first_capture(&LABEL_TAX_ID, text),
            national_id: first_capture(&LABEL_NATIONAL_ID, text),
            start_date: first_capture(&LABEL_START_DATE, text).and_then(|v| parse_date(&v)),
            ..Default::default()
        };
        trace!(?record, "Labeled findings");
        record
    }
}

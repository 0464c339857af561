//! Final record assembly.
//!
//! Applies the rules that must hold on every returned record, whichever
//! path produced its fields.

use tracing::debug;

use crate::extract::TaxBaseExtractor;
use crate::models::config::ExtractionConfig;
use crate::models::DocumentRecord;

/// Make the name fields exclusive according to the taxpayer kind.
///
/// Corporate taxpayers keep only an organization name; everyone else keeps
/// only a personal name.
pub fn resolve_taxpayer_kind(record: &mut DocumentRecord) {
    if record.is_corporate() {
        if let Some(name) = record.personal_name.take() {
            if record.organization_name.is_none() {
                debug!("Corporate taxpayer: moving name to organization");
                record.organization_name = Some(name);
            }
        }
    } else if let Some(name) = record.organization_name.take() {
        if record.personal_name.is_none() {
            debug!("Individual taxpayer: moving name to personal name");
            record.personal_name = Some(name);
        }
    }
}

/// Enforce record invariants before returning it.
pub fn finalize(mut record: DocumentRecord, config: &ExtractionConfig) -> DocumentRecord {
    resolve_taxpayer_kind(&mut record);

    let extractor = TaxBaseExtractor::new(config);
    record.tax_bases = extractor.apply_floor(std::mem::take(&mut record.tax_bases));

    let mut activities = std::mem::take(&mut record.activities);
    activities.retain(|a| !a.description.trim().is_empty());
    for activity in activities {
        record.push_activity(activity);
    }

    for field in [
        &mut record.personal_name,
        &mut record.organization_name,
        &mut record.business_address,
        &mut record.tax_office,
    ] {
        if let Some(value) = field.take() {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            if !value.is_empty() {
                *field = Some(value);
            }
        }
    }

    record
}

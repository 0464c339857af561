//! Structural extraction anchored on the taxpayer block header.
//!
//! Unlabeled plates print the taxpayer name after a "MÜKELLEFİN" header,
//! followed by the address, the tax section and the tax office.

use tracing::trace;

use super::patterns::{
    ADDRESS_MARKERS, CITY_NAMES, DATE_LINE, DIGITS_LINE, NATIONAL_ID_LINE, ORGANIZATION_FORMS,
    TAXPAYER_MARKERS, TAX_SECTION_PHRASES, WEB_FRAGMENTS,
};
use super::{DocumentText, Strategy};
use crate::models::DocumentRecord;
use crate::text::{contains_any, fold};

const NAME_LINES: usize = 3;
const ADDRESS_LINES: usize = 3;
const OFFICE_LINES: usize = 4;

/// Positional reading of the taxpayer block.
#[derive(Debug, Default)]
pub struct StructuralStrategy;

impl Strategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn applies(&self, record: &DocumentRecord, _text: &DocumentText) -> bool {
        let has_name = record.personal_name.is_some() || record.organization_name.is_some();
        !(has_name && record.business_address.is_some() && record.tax_office.is_some())
    }

    fn extract(&self, text: &DocumentText) -> DocumentRecord {
        let mut record = DocumentRecord::new();
        let lines = text.lines();

        let Some(marker) = (0..lines.len()).find(|&i| is_taxpayer_marker(text.line(i))) else {
            return record;
        };
        trace!("Taxpayer block header at line {}", marker);

        // Name block
        let mut name_parts: Vec<&str> = Vec::new();
        let mut address_start = marker + 1;
        let mut i = marker + 1;
        while i < lines.len() && name_parts.len() < NAME_LINES {
            let line = text.line(i);
            if !line.is_empty() {
                if is_address_line(line) || contains_any(line, TAX_SECTION_PHRASES) {
                    break;
                }
                name_parts.push(line);
            }
            i += 1;
            address_start = i;
        }

        if !name_parts.is_empty() {
            let name = name_parts.join(" ");
            if contains_any(&name, ORGANIZATION_FORMS) {
                record.organization_name = Some(name);
            } else {
                record.personal_name = Some(name);
            }
        }

        // Address block
        let mut address_parts: Vec<&str> = Vec::new();
        let mut tax_line = None;
        let mut seen = 0;
        let mut i = address_start;
        while i < lines.len() && seen < ADDRESS_LINES {
            let line = text.line(i);
            if line.is_empty() {
                i += 1;
                continue;
            }
            seen += 1;

            if contains_any(line, TAX_SECTION_PHRASES) {
                tax_line = Some(i);
                break;
            }
            if address_parts.is_empty() {
                if is_address_line(line) {
                    address_parts.push(line);
                }
            } else if address_parts.len() == 1 && has_city(line) {
                address_parts.push(line);
            } else {
                break;
            }
            i += 1;
        }

        if !address_parts.is_empty() {
            record.business_address = Some(address_parts.join(" "));
        }

        // Tax office follows the tax section line
        let tax_line = tax_line.or_else(|| {
            (address_start..lines.len())
                .find(|&i| contains_any(text.line(i), &TAX_SECTION_PHRASES[..3]))
        });
        if let Some(tax_line) = tax_line {
            record.tax_office = find_tax_office(text, tax_line + 1);
        }

        record
    }
}

fn find_tax_office(text: &DocumentText, start: usize) -> Option<String> {
    let mut seen = 0;
    let mut i = start;
    while i < text.lines().len() && seen < OFFICE_LINES {
        let line = text.line(i);
        i += 1;
        if line.is_empty() {
            continue;
        }
        seen += 1;

        if DATE_LINE.is_match(line) || NATIONAL_ID_LINE.is_match(line) {
            break;
        }
        if DIGITS_LINE.is_match(line) || fold(line).contains("vergisi") {
            continue;
        }
        if line.chars().count() > 2 && !contains_any(line, WEB_FRAGMENTS) {
            return Some(line.to_string());
        }
    }
    None
}

fn is_taxpayer_marker(line: &str) -> bool {
    contains_any(line, TAXPAYER_MARKERS)
}

pub(crate) fn is_address_line(line: &str) -> bool {
    contains_any(line, ADDRESS_MARKERS)
}

/// A province name as a `/CITY` or `CITY/` suffix, or at the end of the line.
pub(crate) fn has_city(line: &str) -> bool {
    let folded = fold(line);
    CITY_NAMES.iter().map(|c| fold(c)).any(|city| {
        folded.contains(&format!("/ {}", city))
            || folded.contains(&format!("/{}", city))
            || folded.contains(&format!("{}/", city))
            || folded.ends_with(&city)
    })
}

//! Keyword line scan for layouts the positional strategies miss.

use super::patterns::{
    ADDRESS_LINE_EXCLUSIONS, ADDRESS_LINE_KEYWORDS, ADDRESS_NUMBER_QUALIFIERS, BUILDING_KEYWORDS,
    COMPANY_LINE_EXCLUSIONS, COMPANY_LINE_KEYWORDS, DATE_DOTTED, NATIONAL_ID_LINE_MULTI,
    NATIONAL_ID_TOKEN,
};
use super::{dates::parse_date, DocumentText, Strategy};
use crate::models::DocumentRecord;
use crate::text::{contains_any, fold};

const MIN_COMPANY_LINE: usize = 15;

/// Line-by-line keyword matching.
#[derive(Debug, Default)]
pub struct KeywordLineStrategy;

impl Strategy for KeywordLineStrategy {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn extract(&self, text: &DocumentText) -> DocumentRecord {
        let lines: Vec<&str> = text.lines().iter().map(|l| l.trim()).collect();

        let organization_name = lines
            .iter()
            .find(|line| is_company_line(line))
            .or_else(|| lines.iter().find(|line| is_trade_line(line)))
            .map(|line| line.to_string());

        let business_address = lines
            .iter()
            .find(|line| is_address_line(line))
            .map(|line| line.to_string());

        let national_id = NATIONAL_ID_LINE_MULTI
            .captures(text.as_str())
            .or_else(|| NATIONAL_ID_TOKEN.captures(text.as_str()))
            .map(|caps| caps[1].to_string());

        let start_date = DATE_DOTTED
            .find(text.as_str())
            .and_then(|m| parse_date(m.as_str()));

        DocumentRecord {
            organization_name,
            business_address,
            national_id,
            start_date,
            ..Default::default()
        }
    }
}

fn is_company_line(line: &str) -> bool {
    line.chars().count() >= MIN_COMPANY_LINE
        && contains_any(line, COMPANY_LINE_KEYWORDS)
        && !contains_any(line, COMPANY_LINE_EXCLUSIONS)
}

fn is_trade_line(line: &str) -> bool {
    let folded = fold(line);
    folded.contains("sanayi") && folded.contains("ticaret") && !folded.contains("unvan")
}

fn is_address_line(line: &str) -> bool {
    if line.is_empty() || contains_any(line, ADDRESS_LINE_EXCLUSIONS) {
        return false;
    }
    contains_any(line, ADDRESS_LINE_KEYWORDS)
        || (fold(line).contains("no:") && contains_any(line, ADDRESS_NUMBER_QUALIFIERS))
        || contains_any(line, BUILDING_KEYWORDS)
}

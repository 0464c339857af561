//! Parsing synthetic tax plate PDFs.

mod common;

use common::{pdf_with, utf16_hex};
use levha_core::{IdentifierSource, LevhaError, PdfError, TaxPlateParser, TaxType, TextSource};
use pretty_assertions::assert_eq;

fn plate_content() -> Vec<u8> {
    let mut content = b"BT\n/F1 11 Tf\n72 800 Td\n".to_vec();
    content.extend_from_slice(b"(VERG\\335 LEVHASI) Tj\n");
    content.extend_from_slice(b"(Ad\\375 Soyad\\375: Ali \\326rnek) Tj\n");
    content.extend_from_slice(b"(Vergi Kimlik No: 1222153986) Tj\n");
    content.extend_from_slice(b"(Y\\375ll\\375k Gelir Vergisi \\(Beyan\\)) Tj\n");
    content.extend_from_slice(format!("<{}> Tj\n", utf16_hex("Vergi Dairesi: Konak")).as_bytes());
    content.extend_from_slice(b"ET\n");
    content
}

#[test]
fn labeled_fields_from_content_stream() {
    let bytes = pdf_with(&plate_content(), None);
    let result = TaxPlateParser::default().parse_document(&bytes).unwrap();
    let record = &result.record;

    assert_eq!(record.personal_name.as_deref(), Some("Ali Örnek"));
    assert_eq!(record.tax_id.as_deref(), Some("1222153986"));
    assert_eq!(record.tax_office.as_deref(), Some("Konak"));
    assert_eq!(record.tax_types, vec![TaxType::AnnualIncomeTax]);
    assert!(record.organization_name.is_none());

    let diagnostics = &result.diagnostics;
    assert_eq!(diagnostics.page_count, 1);
    assert_eq!(diagnostics.text_source, TextSource::ContentStream);
    assert_eq!(diagnostics.identifier_source, Some(IdentifierSource::Label));
    assert!(diagnostics.stages.is_empty());
}

#[test]
fn raw_text_is_kept_but_not_serialized() {
    let bytes = pdf_with(&plate_content(), None);
    let record = TaxPlateParser::default().parse_document(&bytes).unwrap().record;

    assert!(record.raw_text.contains("VERGİ LEVHASI"));
    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("raw_text").is_none());
    assert_eq!(json["tax_id"], "1222153986");
}

#[test]
fn identifier_recovered_from_document_text() {
    let content = b"BT\n(VERG\\335 LEVHASI) Tj\n(Sicil 1222153986) Tj\nET\n";
    let bytes = pdf_with(content, None);
    let result = TaxPlateParser::default().parse_document(&bytes).unwrap();

    assert_eq!(result.record.tax_id.as_deref(), Some("1222153986"));
    assert_eq!(result.diagnostics.identifier_source, Some(IdentifierSource::Text));
}

#[test]
fn garbage_input_is_a_pdf_error() {
    let err = TaxPlateParser::default()
        .parse_document(b"not a pdf at all")
        .unwrap_err();
    assert!(matches!(err, LevhaError::Pdf(PdfError::Parse(_))));
}

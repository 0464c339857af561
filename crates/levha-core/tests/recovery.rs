//! Identifier recovery from rendered barcodes.

mod common;

use std::io::Cursor;

use common::{code128_c, pdf_with};
use image::{DynamicImage, ImageFormat};
use levha_core::recovery::barcode::scan_code128;
use levha_core::recovery::AttemptBudget;
use levha_core::{BarcodeReader, IdentifierSource, RxingBarcodeReader, Symbology, TaxPlateParser};
use pretty_assertions::assert_eq;

const IDENTIFIER: &str = "8589706200";

#[test]
fn rxing_decodes_rendered_code128() {
    let symbol = code128_c(IDENTIFIER, 4, 80);
    assert_eq!(
        RxingBarcodeReader.decode(&symbol, Symbology::Code128).as_deref(),
        Some(IDENTIFIER)
    );
}

#[test]
fn rotated_symbol_is_found() {
    let symbol = DynamicImage::ImageLuma8(code128_c(IDENTIFIER, 4, 80)).rotate90();
    let mut budget = AttemptBudget::new(64);

    let found = scan_code128(&RxingBarcodeReader, &symbol, &mut budget);
    assert_eq!(found.as_deref(), Some(IDENTIFIER));
    assert!(budget.used() > 1);
}

#[test]
fn embedded_barcode_supplies_missing_identifier() {
    let symbol = code128_c(IDENTIFIER, 4, 80);
    let bytes = pdf_with(b"BT\n(VERG\\335 LEVHASI) Tj\nET\n", Some(&symbol));

    let result = TaxPlateParser::default().parse_document(&bytes).unwrap();

    assert_eq!(result.record.tax_id.as_deref(), Some(IDENTIFIER));
    assert_eq!(
        result.diagnostics.identifier_source,
        Some(IdentifierSource::Barcode)
    );
    assert_eq!(result.diagnostics.stages[0].stage, "embedded_images");
    assert!(result.diagnostics.warnings.is_empty());
}

#[test]
fn standalone_image_bytes() {
    let symbol = DynamicImage::ImageLuma8(code128_c(IDENTIFIER, 4, 80));
    let mut png = Vec::new();
    symbol
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let result = TaxPlateParser::default().recover_identifier(&png).unwrap();

    assert!(result.found());
    assert_eq!(result.identifier.as_deref(), Some(IDENTIFIER));
    assert_eq!(
        result.diagnostics.identifier_source,
        Some(IdentifierSource::Barcode)
    );
}

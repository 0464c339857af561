//! Core library for Turkish tax plate (Vergi Levhası) processing.
//!
//! This crate provides:
//! - PDF access (content streams, embedded images, text layer)
//! - Content-stream string decoding (Windows-1254, UTF-16BE, escapes)
//! - Field extraction from label-optional document text
//! - Tax identifier recovery from barcodes and printed digits
//! - Record assembly with taxpayer-kind disambiguation

pub mod assembly;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod parser;
pub mod pdf;
pub mod recovery;
pub mod text;

pub use error::{LevhaError, PdfError, RecoveryError, Result};
pub use extract::{DocumentText, FieldExtractionEngine, Strategy};
pub use models::{ActivityEntry, DocumentRecord, LevhaConfig, TaxBaseEntry, TaxType};
pub use ocr::{DigitClassifier, GlyphClassifier, GlyphReader};
pub use parser::{
    DebugArtifacts, Diagnostics, NamedRaster, ParseResult, RecoveryResult, TaxPlateParser,
    TextSource,
};
pub use pdf::{PageSource, PdfDocument};
pub use recovery::{
    is_valid_identifier, BarcodeReader, IdentifierSource, RecoveryPipeline, RxingBarcodeReader,
    Symbology,
};

//! Tax identifier recovery.
//!
//! Runs when the extracted text carries no tax identifier. Stages are tried
//! in order: embedded image barcodes, the page raster, glyph recognition,
//! digit runs in the text, then raw document bytes.

pub mod barcode;
pub mod pipeline;
pub mod regions;
pub mod stages;
pub mod validate;

pub use barcode::{BarcodeReader, RxingBarcodeReader, Symbology};
pub use pipeline::{
    AttemptBudget, IdentifierSource, RecoveryContext, RecoveryInput, RecoveryOutcome,
    RecoveryPipeline, Stage, StageOutcome, StageReport, StageStatus,
};
pub use validate::{is_valid_identifier, looks_like_date};

impl RecoveryPipeline {
    /// Pipeline with the standard stage order.
    pub fn standard() -> Self {
        Self::new(stages::standard_stages())
    }
}

impl Default for RecoveryPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

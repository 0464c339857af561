//! Tax plate parser combining text extraction and identifier recovery.

use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assembly::finalize;
use crate::error::{PdfError, RecoveryError, Result};
use crate::extract::{DocumentText, FieldExtractionEngine};
use crate::models::{DocumentRecord, LevhaConfig};
use crate::ocr::{GlyphClassifier, GlyphReader};
use crate::pdf::{PageSource, PdfDocument};
use crate::recovery::{
    BarcodeReader, IdentifierSource, RecoveryContext, RecoveryInput, RecoveryOutcome,
    RecoveryPipeline, RxingBarcodeReader, StageReport,
};
use crate::text::page_text;

/// Where the document text came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Strings decoded from page content streams.
    ContentStream,
    /// Text layer of a general-purpose extractor.
    TextLayer,
    /// Caller-supplied text.
    Provided,
    /// No text could be read.
    #[default]
    None,
}

/// Intermediate raster kept for inspection.
#[derive(Debug, Clone)]
pub struct NamedRaster {
    pub name: String,
    pub image: DynamicImage,
}

/// Intermediate results, collected only in debug mode.
#[derive(Debug, Clone, Default)]
pub struct DebugArtifacts {
    /// Normalized document text.
    pub normalized_text: String,
    /// Rasters produced by recovery stages, in creation order.
    pub rasters: Vec<NamedRaster>,
}

/// How a result was produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Non-fatal problems.
    pub warnings: Vec<String>,
    /// Pages in the document.
    pub page_count: u32,
    /// Origin of the text fed to extraction.
    pub text_source: TextSource,
    /// Origin of the tax identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_source: Option<IdentifierSource>,
    /// Recovery stages that ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageReport>,
    /// Decode attempts made by recovery.
    pub attempts: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Debug artifacts.
    #[serde(skip)]
    pub artifacts: Option<DebugArtifacts>,
}

impl Diagnostics {
    fn apply_recovery(&mut self, outcome: RecoveryOutcome) {
        self.identifier_source = outcome.source;
        self.stages = outcome.reports;
        self.attempts = outcome.attempts;
    }
}

/// Record and diagnostics of one parse.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub record: DocumentRecord,
    pub diagnostics: Diagnostics,
}

/// Outcome of a standalone identifier recovery.
#[derive(Debug, Clone)]
pub struct RecoveryResult {
    pub identifier: Option<String>,
    pub diagnostics: Diagnostics,
}

impl RecoveryResult {
    pub fn found(&self) -> bool {
        self.identifier.is_some()
    }
}

/// Parser for Vergi Levhası documents.
///
/// Instances share no mutable state; use one per thread for parallel work.
pub struct TaxPlateParser {
    config: LevhaConfig,
    engine: FieldExtractionEngine,
    pipeline: RecoveryPipeline,
    barcode: Box<dyn BarcodeReader>,
    glyphs: GlyphReader,
}

impl TaxPlateParser {
    /// Create a parser with the given configuration.
    pub fn new(config: LevhaConfig) -> Self {
        Self {
            engine: FieldExtractionEngine::new(config.extraction.clone()),
            pipeline: RecoveryPipeline::standard(),
            barcode: Box::new(RxingBarcodeReader),
            glyphs: GlyphReader::new(&config.recovery),
            config,
        }
    }

    /// Replace the barcode reader.
    pub fn with_barcode_reader(mut self, reader: Box<dyn BarcodeReader>) -> Self {
        self.barcode = reader;
        self
    }

    /// Replace the glyph classifier.
    pub fn with_glyph_classifier(mut self, classifier: Box<dyn GlyphClassifier>) -> Self {
        self.glyphs = self.glyphs.with_classifier(classifier);
        self
    }

    /// Replace the recovery stage list.
    pub fn with_pipeline(mut self, pipeline: RecoveryPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Enable or disable debug artifacts.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Enable or disable identifier recovery.
    pub fn with_recovery(mut self, enabled: bool) -> Self {
        self.config.recovery.enabled = enabled;
        self
    }

    pub fn config(&self) -> &LevhaConfig {
        &self.config
    }

    /// Parse PDF bytes.
    ///
    /// Fails only when the document structure is unreadable; missing fields
    /// are reported in the record.
    pub fn parse_document(&self, data: &[u8]) -> Result<ParseResult> {
        let document = PdfDocument::load(data)?;
        self.parse_source(&document)
    }

    /// Parse any page source.
    pub fn parse_source(&self, source: &dyn PageSource) -> Result<ParseResult> {
        let start = Instant::now();
        let mut diagnostics = Diagnostics {
            page_count: source.page_count(),
            ..Default::default()
        };

        let (raw, text_source) = self.document_text(source, &mut diagnostics)?;
        diagnostics.text_source = text_source;

        let text = DocumentText::new(&raw);
        let record = self.extract(&text, RecoveryInput::Document(source), &mut diagnostics);
        diagnostics.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Parsed document: {} pages, name={:?}, tax_id={:?}, {}ms",
            diagnostics.page_count,
            record.display_name(),
            record.tax_id,
            diagnostics.processing_time_ms
        );
        Ok(ParseResult {
            record,
            diagnostics,
        })
    }

    /// Parse already extracted text.
    ///
    /// Identifier recovery is limited to the text itself.
    pub fn parse_text(&self, raw: &str) -> ParseResult {
        let start = Instant::now();
        let mut diagnostics = Diagnostics {
            text_source: TextSource::Provided,
            ..Default::default()
        };

        let text = DocumentText::new(raw);
        let record = self.extract(&text, RecoveryInput::Text, &mut diagnostics);
        diagnostics.processing_time_ms = start.elapsed().as_millis() as u64;

        ParseResult {
            record,
            diagnostics,
        }
    }

    /// Recover the tax identifier from PDF or raster image bytes.
    pub fn recover_identifier(&self, data: &[u8]) -> Result<RecoveryResult> {
        if let Ok(document) = PdfDocument::load(data) {
            let start = Instant::now();
            let mut diagnostics = Diagnostics {
                page_count: document.page_count(),
                ..Default::default()
            };
            let raw = match self.document_text(&document, &mut diagnostics) {
                Ok((raw, source)) => {
                    diagnostics.text_source = source;
                    raw
                }
                Err(e) => {
                    diagnostics.warnings.push(e.to_string());
                    String::new()
                }
            };
            let text = DocumentText::new(&raw);

            let identifier = self.run_recovery(
                RecoveryInput::Document(&document),
                text.as_str(),
                &mut diagnostics,
            );
            diagnostics.processing_time_ms = start.elapsed().as_millis() as u64;
            return Ok(RecoveryResult {
                identifier,
                diagnostics,
            });
        }

        match image::load_from_memory(data) {
            Ok(image) => Ok(self.recover_from_image(&image)),
            Err(e) => Err(RecoveryError::UnsupportedInput(e.to_string()).into()),
        }
    }

    /// Recover the tax identifier from a raster.
    pub fn recover_from_image(&self, image: &DynamicImage) -> RecoveryResult {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::default();
        let identifier = self.run_recovery(RecoveryInput::Raster(image), "", &mut diagnostics);
        diagnostics.processing_time_ms = start.elapsed().as_millis() as u64;
        RecoveryResult {
            identifier,
            diagnostics,
        }
    }

    /// Extraction, recovery when needed, then final assembly.
    fn extract(
        &self,
        text: &DocumentText,
        input: RecoveryInput<'_>,
        diagnostics: &mut Diagnostics,
    ) -> DocumentRecord {
        let mut record = self.engine.extract(text);
        record.raw_text = text.as_str().to_string();

        if record.tax_id.is_some() {
            diagnostics.identifier_source = Some(IdentifierSource::Label);
        } else if self.config.recovery.enabled {
            record.tax_id = self.run_recovery(input, text.as_str(), diagnostics);
            if record.tax_id.is_none() {
                diagnostics
                    .warnings
                    .push("tax identifier not found".to_string());
            }
        }

        if self.config.debug {
            diagnostics
                .artifacts
                .get_or_insert_with(DebugArtifacts::default)
                .normalized_text = text.as_str().to_string();
        }

        finalize(record, &self.config.extraction)
    }

    fn run_recovery(
        &self,
        input: RecoveryInput<'_>,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let mut ctx = RecoveryContext::new(input, &self.config.recovery, self.barcode.as_ref(), &self.glyphs)
            .with_text(text)
            .with_artifacts(self.config.debug);

        let outcome = self.pipeline.run(&mut ctx);
        let identifier = outcome.identifier.clone();
        diagnostics.apply_recovery(outcome);

        if self.config.debug {
            let rasters = ctx
                .take_artifacts()
                .into_iter()
                .map(|(name, image)| NamedRaster { name, image });
            diagnostics
                .artifacts
                .get_or_insert_with(DebugArtifacts::default)
                .rasters
                .extend(rasters);
        }

        identifier
    }

    /// Decode the text of every page.
    ///
    /// Falls back to the text layer when content streams give too little text.
    fn document_text(
        &self,
        source: &dyn PageSource,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<(String, TextSource), PdfError> {
        let page_count = source.page_count();
        let limit = match self.config.pdf.max_pages {
            0 => page_count,
            max => page_count.min(u32::try_from(max).unwrap_or(u32::MAX)),
        };

        let mut pages = Vec::new();
        for page in 1..=limit {
            match source.page_content(page) {
                Ok(content) => pages.push(page_text(&content)),
                Err(e) => {
                    warn!("Skipping page {}: {}", page, e);
                    diagnostics.warnings.push(format!("page {}: {}", page, e));
                }
            }
        }
        if pages.is_empty() {
            return Err(PdfError::ContentUnavailable);
        }

        let text = pages.join("\n");
        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        if visible >= self.config.pdf.min_text_length.max(1) {
            return Ok((text, TextSource::ContentStream));
        }

        if self.config.pdf.fallback_text_extraction {
            debug!("Content streams gave {} characters, trying text layer", visible);
            match source.text_layer() {
                Ok(layer) if !layer.trim().is_empty() => return Ok((layer, TextSource::TextLayer)),
                Ok(_) => {}
                Err(e) => diagnostics.warnings.push(e.to_string()),
            }
        }

        let text_source = if visible > 0 {
            TextSource::ContentStream
        } else {
            TextSource::None
        };
        Ok((text, text_source))
    }
}

impl Default for TaxPlateParser {
    fn default() -> Self {
        Self::new(LevhaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::Result as PdfResult;
    use crate::recovery::Symbology;
    use image::GrayImage;
    use pretty_assertions::assert_eq;

    struct Pages(Vec<std::result::Result<Vec<u8>, ()>>, &'static str);

    impl PageSource for Pages {
        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn page_content(&self, page: u32) -> PdfResult<Vec<u8>> {
            self.0[page as usize - 1]
                .clone()
                .map_err(|_| PdfError::InvalidPage(page))
        }

        fn page_images(&self, _: u32) -> Vec<DynamicImage> {
            Vec::new()
        }

        fn text_layer(&self) -> PdfResult<String> {
            Ok(self.1.to_string())
        }

        fn raw_bytes(&self) -> &[u8] {
            b""
        }
    }

    struct AlwaysDecodes;

    impl BarcodeReader for AlwaysDecodes {
        fn decode(&self, _: &GrayImage, _: Symbology) -> Option<String> {
            Some("8589706200".to_string())
        }
    }

    #[test]
    fn test_labeled_identifier_skips_recovery() {
        let result = TaxPlateParser::default().parse_text("Vergi Kimlik No: 1234567890\n");
        assert_eq!(result.record.tax_id.as_deref(), Some("1234567890"));
        assert_eq!(result.diagnostics.identifier_source, Some(IdentifierSource::Label));
        assert!(result.diagnostics.stages.is_empty());
    }

    #[test]
    fn test_text_recovery_in_parse_text() {
        let result = TaxPlateParser::default().parse_text("ONAY KODU\n1222153986\n");
        assert_eq!(result.record.tax_id.as_deref(), Some("1222153986"));
        assert_eq!(result.diagnostics.identifier_source, Some(IdentifierSource::Text));
    }

    #[test]
    fn test_missing_identifier_is_a_warning() {
        let result = TaxPlateParser::default().parse_text("Vergi Dairesi: Kadıköy\n");
        assert!(result.record.tax_id.is_none());
        assert_eq!(result.diagnostics.warnings, vec!["tax identifier not found"]);
    }

    #[test]
    fn test_unreadable_pages_fail() {
        let source = Pages(vec![Err(()), Err(())], "");
        let err = TaxPlateParser::default().parse_source(&source).unwrap_err();
        assert!(matches!(err, crate::LevhaError::Pdf(PdfError::ContentUnavailable)));
    }

    #[test]
    fn test_text_layer_fallback() {
        let source = Pages(vec![Ok(b"BT ET".to_vec())], "Vergi Dairesi: Beyoğlu\n");
        let result = TaxPlateParser::default()
            .with_recovery(false)
            .parse_source(&source)
            .unwrap();
        assert_eq!(result.diagnostics.text_source, TextSource::TextLayer);
        assert_eq!(result.record.tax_office.as_deref(), Some("Beyoğlu"));
    }

    #[test]
    fn test_skipped_page_is_reported() {
        let source = Pages(vec![Err(()), Ok(b"(Vergi Dairesi: Konak) Tj".to_vec())], "");
        let result = TaxPlateParser::default()
            .with_recovery(false)
            .parse_source(&source)
            .unwrap();
        assert_eq!(result.record.tax_office.as_deref(), Some("Konak"));
        assert_eq!(result.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn test_recover_from_raster_with_debug_artifacts() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(300, 200));
        let parser = TaxPlateParser::default()
            .with_barcode_reader(Box::new(AlwaysDecodes))
            .with_debug(true);
        let result = parser.recover_from_image(&image);

        assert_eq!(result.identifier.as_deref(), Some("8589706200"));
        assert_eq!(result.diagnostics.identifier_source, Some(IdentifierSource::Barcode));
        let artifacts = result.diagnostics.artifacts.unwrap();
        assert_eq!(artifacts.rasters[0].name, "page_raster");
        assert_eq!(artifacts.rasters[0].image.width(), 900);
    }

    struct DecodesDate;

    impl BarcodeReader for DecodesDate {
        fn decode(&self, _: &GrayImage, _: Symbology) -> Option<String> {
            Some("1501202300".to_string())
        }
    }

    #[test]
    fn test_date_like_barcode_is_rejected() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(400, 300, image::Luma([255])));
        let result = TaxPlateParser::default()
            .with_barcode_reader(Box::new(DecodesDate))
            .recover_from_image(&image);

        assert_eq!(result.identifier, None);
        assert_eq!(result.diagnostics.identifier_source, None);
        assert!(!result.diagnostics.stages.is_empty());
    }

    #[test]
    fn test_custom_pipeline_and_classifier() {
        let parser = TaxPlateParser::default()
            .with_pipeline(RecoveryPipeline::new(Vec::new()))
            .with_glyph_classifier(Box::new(crate::ocr::DigitClassifier::new()));
        let result = parser.parse_text("ONAY KODU\n1222153986\n");

        assert!(result.record.tax_id.is_none());
        assert!(result.diagnostics.stages.is_empty());
        assert_eq!(result.diagnostics.warnings, vec!["tax identifier not found"]);
    }

    #[test]
    fn test_unsupported_input() {
        let err = TaxPlateParser::default()
            .recover_identifier(b"not a document")
            .unwrap_err();
        assert!(matches!(
            err,
            crate::LevhaError::Recovery(RecoveryError::UnsupportedInput(_))
        ));
    }
}

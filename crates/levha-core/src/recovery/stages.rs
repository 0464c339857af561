//! The standard recovery stages, in pipeline order.

use image::{DynamicImage, GenericImageView};
use lazy_static::lazy_static;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use tracing::{debug, warn};

use super::barcode::{scan_code128, scan_linear};
use super::pipeline::{IdentifierSource, RecoveryContext, RecoveryInput, Stage, StageOutcome};
use super::regions::{BARCODE_AREA, BARCODE_FALLBACK_AREAS, IDENTIFIER_TEXT_AREA};
use super::validate::{hex_to_digits, identifier_from_digits, is_plausible_identifier};
use crate::ocr::upscale;

/// The first embedded image gets an upscale retry below this height.
const FIRST_IMAGE_MIN_HEIGHT: u32 = 100;

lazy_static! {
    static ref TEXT_CANDIDATE: Regex = Regex::new(r"\b([1-9]\d{9})\b").unwrap();
    static ref RAW_LITERAL: BytesRegex = BytesRegex::new(r"(?-u)\((\d{10})\)").unwrap();
    static ref RAW_HEX: BytesRegex = BytesRegex::new(r"(?-u)<((?:3[0-9]){10})>").unwrap();
    static ref RAW_BARE: BytesRegex = BytesRegex::new(r"(?-u)(?:^|\s)(\d{10})(?:\s|$)").unwrap();
}

/// Stage list used by [`super::RecoveryPipeline::standard`].
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(EmbeddedImageStage),
        Box::new(PageRasterStage),
        Box::new(GlyphStage),
        Box::new(TextPatternStage),
        Box::new(RawBytesStage),
    ]
}

/// Barcode scan of every embedded image.
pub struct EmbeddedImageStage;

impl Stage for EmbeddedImageStage {
    fn name(&self) -> &'static str {
        "embedded_images"
    }

    fn source(&self) -> IdentifierSource {
        IdentifierSource::Barcode
    }

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
        let RecoveryInput::Document(source) = ctx.input() else {
            return StageOutcome::Skip("input is not a document".to_string());
        };
        let images = source.embedded_images();
        if images.is_empty() {
            return StageOutcome::Skip("no embedded images".to_string());
        }
        debug!("Scanning {} embedded images", images.len());

        let config = ctx.config();
        let reader = ctx.barcode();

        for (index, image) in images.iter().enumerate() {
            ctx.record_artifact(format!("embedded_{}", index + 1), image);
            let (width, height) = image.dimensions();

            // The identifier barcode is normally the first image.
            let found = if index == 0 {
                scan_code128(reader, image, &mut ctx.budget).or_else(|| {
                    (width < config.embedded_min_width || height < FIRST_IMAGE_MIN_HEIGHT)
                        .then(|| {
                            upscale(image, config.barcode_image_upscale_factor, config.max_upscaled_pixels)
                        })
                        .flatten()
                        .and_then(|up| scan_code128(reader, &up, &mut ctx.budget))
                })
            } else {
                scan_linear(reader, image, &mut ctx.budget).or_else(|| {
                    (width < config.embedded_min_width || height < config.embedded_min_height)
                        .then(|| upscale(image, config.embedded_upscale_factor, config.max_upscaled_pixels))
                        .flatten()
                        .and_then(|up| scan_linear(reader, &up, &mut ctx.budget))
                })
            };

            if let Some(id) = found {
                return StageOutcome::Found(id);
            }
            if ctx.budget.is_exhausted() {
                return StageOutcome::Stop("attempt budget exhausted".to_string());
            }
        }

        StageOutcome::Skip(format!("no barcode in {} images", images.len()))
    }
}

/// Barcode scan of the page raster, whole then cropped.
pub struct PageRasterStage;

impl Stage for PageRasterStage {
    fn name(&self) -> &'static str {
        "page_raster"
    }

    fn source(&self) -> IdentifierSource {
        IdentifierSource::Barcode
    }

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
        let Some(page) = ctx.page_image() else {
            return StageOutcome::Skip("no page raster".to_string());
        };
        let reader = ctx.barcode();

        if let Some(id) = scan_linear(reader, &page, &mut ctx.budget) {
            return StageOutcome::Found(id);
        }

        for region in std::iter::once(&BARCODE_AREA).chain(BARCODE_FALLBACK_AREAS.iter()) {
            if ctx.budget.is_exhausted() {
                return StageOutcome::Stop("attempt budget exhausted".to_string());
            }
            let Some(cropped) = region.crop(&page) else {
                continue;
            };
            ctx.record_artifact(region.name, &cropped);
            if let Some(id) = scan_linear(reader, &cropped, &mut ctx.budget) {
                debug!("Barcode found in region {}", region.name);
                return StageOutcome::Found(id);
            }
        }

        if ctx.budget.is_exhausted() {
            return StageOutcome::Stop("attempt budget exhausted".to_string());
        }
        StageOutcome::Skip("no barcode on page raster".to_string())
    }
}

/// Glyph recognition of the printed identifier.
pub struct GlyphStage;

impl GlyphStage {
    fn read(ctx: &mut RecoveryContext<'_>, image: &DynamicImage) -> Option<String> {
        if !ctx.budget.try_take() {
            return None;
        }
        let reading = ctx.glyphs().read(&image.to_luma8());
        identifier_from_digits(&reading.digits)
    }
}

impl Stage for GlyphStage {
    fn name(&self) -> &'static str {
        "glyph_ocr"
    }

    fn source(&self) -> IdentifierSource {
        IdentifierSource::Glyph
    }

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
        let Some(page) = ctx.page_image() else {
            return StageOutcome::Skip("no page raster".to_string());
        };

        if let RecoveryInput::Document(_) = ctx.input() {
            if let Some(area) = IDENTIFIER_TEXT_AREA.crop(&page) {
                ctx.record_artifact(IDENTIFIER_TEXT_AREA.name, &area);
                if let Some(id) = scan_linear(ctx.barcode(), &area, &mut ctx.budget) {
                    return StageOutcome::Found(id);
                }
                if let Some(id) = Self::read(ctx, &area) {
                    return StageOutcome::Found(id);
                }
            }
        }

        if let Some(id) = Self::read(ctx, &page) {
            return StageOutcome::Found(id);
        }

        if ctx.budget.is_exhausted() {
            return StageOutcome::Stop("attempt budget exhausted".to_string());
        }
        StageOutcome::Skip("no ten-digit glyph run".to_string())
    }
}

/// Digit runs in the extracted text.
pub struct TextPatternStage;

impl Stage for TextPatternStage {
    fn name(&self) -> &'static str {
        "text_patterns"
    }

    fn source(&self) -> IdentifierSource {
        IdentifierSource::Text
    }

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
        let text = ctx.text();
        if text.trim().is_empty() {
            return StageOutcome::Skip("no extracted text".to_string());
        }

        TEXT_CANDIDATE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .find(|candidate| is_plausible_identifier(candidate, text))
            .map(|id| StageOutcome::Found(id.to_string()))
            .unwrap_or_else(|| StageOutcome::Skip("no plausible digit run in text".to_string()))
    }
}

/// Digit patterns in the undecoded document bytes.
pub struct RawBytesStage;

impl RawBytesStage {
    fn candidates(raw: &[u8]) -> Vec<String> {
        let ascii = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();

        let literals = RAW_LITERAL
            .captures_iter(raw)
            .filter_map(|c| c.get(1))
            .map(|m| ascii(m.as_bytes()));
        let hex = RAW_HEX
            .captures_iter(raw)
            .filter_map(|c| c.get(1))
            .map(|m| hex_to_digits(&ascii(m.as_bytes())));
        let bare = RAW_BARE
            .captures_iter(raw)
            .filter_map(|c| c.get(1))
            .map(|m| ascii(m.as_bytes()));

        literals.chain(hex).chain(bare).collect()
    }
}

impl Stage for RawBytesStage {
    fn name(&self) -> &'static str {
        "raw_bytes"
    }

    fn source(&self) -> IdentifierSource {
        IdentifierSource::RawBytes
    }

    fn run(&self, ctx: &mut RecoveryContext<'_>) -> StageOutcome {
        if !ctx.config().scan_raw_bytes {
            return StageOutcome::Skip("raw byte scan disabled".to_string());
        }
        let RecoveryInput::Document(source) = ctx.input() else {
            return StageOutcome::Skip("input is not a document".to_string());
        };

        let text = ctx.text();
        let candidates = Self::candidates(source.raw_bytes());
        match candidates
            .into_iter()
            .find(|candidate| is_plausible_identifier(candidate, text))
        {
            Some(id) => {
                warn!("Tax identifier taken from raw document bytes");
                StageOutcome::Found(id)
            }
            None => StageOutcome::Skip("no plausible byte pattern".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecoveryConfig;
    use crate::ocr::GlyphReader;
    use crate::pdf::{PageSource, Result as PdfResult};
    use crate::recovery::barcode::{BarcodeReader, Symbology};
    use crate::recovery::pipeline::RecoveryPipeline;
    use image::{GrayImage, Luma};
    use pretty_assertions::assert_eq;

    struct FakeDocument {
        images: Vec<DynamicImage>,
        raw: Vec<u8>,
    }

    impl PageSource for FakeDocument {
        fn page_count(&self) -> u32 {
            1
        }

        fn page_content(&self, _: u32) -> PdfResult<Vec<u8>> {
            Ok(Vec::new())
        }

        fn page_images(&self, _: u32) -> Vec<DynamicImage> {
            self.images.clone()
        }

        fn text_layer(&self) -> PdfResult<String> {
            Ok(String::new())
        }

        fn raw_bytes(&self) -> &[u8] {
            &self.raw
        }
    }

    /// Reads a barcode only from images of one exact size.
    struct SizedReader(u32, u32, &'static str);

    impl BarcodeReader for SizedReader {
        fn decode(&self, image: &GrayImage, _: Symbology) -> Option<String> {
            (image.dimensions() == (self.0, self.1)).then(|| self.2.to_string())
        }
    }

    fn gray(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([200])))
    }

    fn run_stage(stage: &dyn Stage, doc: &FakeDocument, reader: &dyn BarcodeReader, text: &str) -> StageOutcome {
        let config = RecoveryConfig::default();
        let glyphs = GlyphReader::default();
        let mut ctx = RecoveryContext::new(RecoveryInput::Document(doc), &config, reader, &glyphs).with_text(text);
        stage.run(&mut ctx)
    }

    #[test]
    fn test_embedded_first_image_upscaled() {
        let doc = FakeDocument {
            images: vec![gray(100, 30)],
            raw: Vec::new(),
        };
        let reader = SizedReader(400, 120, "8589706200");
        assert_eq!(
            run_stage(&EmbeddedImageStage, &doc, &reader, ""),
            StageOutcome::Found("8589706200".to_string())
        );
    }

    #[test]
    fn test_embedded_stage_without_images() {
        let doc = FakeDocument {
            images: Vec::new(),
            raw: Vec::new(),
        };
        let outcome = run_stage(&EmbeddedImageStage, &doc, &SizedReader(1, 1, ""), "");
        assert!(matches!(outcome, StageOutcome::Skip(_)));
    }

    #[test]
    fn test_invalid_barcode_payload_is_not_found() {
        let doc = FakeDocument {
            images: vec![gray(100, 30), gray(600, 300)],
            raw: Vec::new(),
        };
        for payload in ["1501202300", "0000000000"] {
            let reader = SizedReader(400, 120, payload);
            assert!(!matches!(
                run_stage(&EmbeddedImageStage, &doc, &reader, ""),
                StageOutcome::Found(_)
            ));
        }
    }

    #[test]
    fn test_page_raster_crop_region() {
        // 1200x1000 page: barcode area crop is 456x280
        let doc = FakeDocument {
            images: vec![gray(1200, 1000)],
            raw: Vec::new(),
        };
        let reader = SizedReader(456, 280, "1222153986");
        assert_eq!(
            run_stage(&PageRasterStage, &doc, &reader, ""),
            StageOutcome::Found("1222153986".to_string())
        );
    }

    #[test]
    fn test_text_stage_rejects_implausible_runs() {
        let doc = FakeDocument {
            images: Vec::new(),
            raw: Vec::new(),
        };
        let reader = SizedReader(1, 1, "");
        let text = "Tarih 1501202300\nSıra 1234567890\nNo 1222153986";
        assert_eq!(
            run_stage(&TextPatternStage, &doc, &reader, text),
            StageOutcome::Found("1222153986".to_string())
        );
        assert!(matches!(
            run_stage(&TextPatternStage, &doc, &reader, "1234567890"),
            StageOutcome::Skip(_)
        ));
    }

    #[test]
    fn test_raw_byte_patterns() {
        let candidates = RawBytesStage::candidates(b"BT (1222153986) Tj <31323232313533393836> Tj\n8589706200 ET");
        assert_eq!(candidates, vec!["1222153986", "1222153986", "8589706200"]);

        let doc = FakeDocument {
            images: Vec::new(),
            raw: b"stream <38353839373036323030> endstream".to_vec(),
        };
        assert_eq!(
            run_stage(&RawBytesStage, &doc, &SizedReader(1, 1, ""), ""),
            StageOutcome::Found("8589706200".to_string())
        );
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            RecoveryPipeline::new(standard_stages()).stage_names(),
            vec!["embedded_images", "page_raster", "glyph_ocr", "text_patterns", "raw_bytes"]
        );
    }
}

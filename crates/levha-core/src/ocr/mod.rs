//! Glyph recognition for printed identifier digits.
//!
//! The pipeline is: adaptive binarization, connected components, shape
//! filtering, reading order, then per-glyph classification.

pub mod classifier;
pub mod preprocessing;
pub mod segmentation;

pub use classifier::{DigitClassifier, DigitFeatures, GlyphClassifier};
pub use preprocessing::{adaptive_binarize, threshold_enhance, upscale, Rotation};
pub use segmentation::GlyphBox;

use image::GrayImage;
use tracing::debug;

use crate::models::config::RecoveryConfig;

/// Digits read from an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphReading {
    /// Accepted digits in reading order.
    pub digits: String,
    /// Glyph candidates that passed the shape filter.
    pub candidates: usize,
    /// Candidates dropped for low confidence.
    pub rejected: usize,
}

/// Reads digit strings from grayscale images.
pub struct GlyphReader {
    classifier: Box<dyn GlyphClassifier>,
    block_size: u32,
    offset: i32,
    confidence_floor: f32,
}

impl GlyphReader {
    /// Create a reader using the built-in digit classifier.
    pub fn new(config: &RecoveryConfig) -> Self {
        Self {
            classifier: Box::new(DigitClassifier::new()),
            block_size: config.adaptive_block_size,
            offset: config.adaptive_offset,
            confidence_floor: config.glyph_confidence_floor,
        }
    }

    /// Replace the glyph classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn GlyphClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Segment and classify every digit-shaped glyph.
    pub fn read(&self, image: &GrayImage) -> GlyphReading {
        let binary = adaptive_binarize(image, self.block_size, self.offset);
        let components = segmentation::find_components(&binary);
        let boxes = segmentation::filter_digit_boxes(components, binary.width(), binary.height());
        let boxes = segmentation::order_boxes(boxes);

        let mut reading = GlyphReading {
            candidates: boxes.len(),
            ..Default::default()
        };

        for glyph_box in &boxes {
            let glyph = segmentation::extract_glyph(&binary, glyph_box);
            let (digit, confidence) = self.classifier.classify(&glyph);
            if confidence >= self.confidence_floor {
                reading.digits.push(char::from(b'0' + digit.min(9)));
            } else {
                reading.rejected += 1;
            }
        }

        debug!(
            "Glyph reading: {} candidates, {} rejected, digits={:?}",
            reading.candidates, reading.rejected, reading.digits
        );
        reading
    }
}

impl Default for GlyphReader {
    fn default() -> Self {
        Self::new(&RecoveryConfig::default())
    }
}

//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Tax-base amounts must exceed this many currency units.
pub const TAX_BASE_FLOOR: u32 = 1000;

/// Minimum classifier confidence for a glyph to count as a digit.
pub const GLYPH_CONFIDENCE_FLOOR: f32 = 0.3;

/// Main configuration for the levha pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevhaConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Identifier recovery configuration.
    pub recovery: RecoveryConfig,

    /// Collect intermediate artifacts (normalized text, stage rasters).
    pub debug: bool,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Fall back to the document text layer when content streams yield no text.
    pub fallback_text_extraction: bool,

    /// Minimum non-whitespace characters for content-stream text to count.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            fallback_text_extraction: true,
            min_text_length: 1,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Tax-base amounts at or below this value are discarded.
    pub tax_base_floor: u32,

    /// Earliest accepted tax-base year.
    pub min_tax_base_year: i32,

    /// Latest accepted tax-base year.
    pub max_tax_base_year: i32,

    /// Run the keyword-line pass for name, address and identity lines.
    pub supplementary_line_scan: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            tax_base_floor: TAX_BASE_FLOOR,
            min_tax_base_year: 2000,
            max_tax_base_year: 2100,
            supplementary_line_scan: true,
        }
    }
}

/// Identifier recovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Run the recovery pipeline when no identifier was found in text.
    pub enabled: bool,

    /// Upper bound on decode attempts for one recovery run.
    pub max_decode_attempts: usize,

    /// Minimum classifier confidence for a glyph.
    pub glyph_confidence_floor: f32,

    /// Upscale factor for the first embedded (barcode) image.
    pub barcode_image_upscale_factor: u32,

    /// Upscale factor for other embedded images.
    pub embedded_upscale_factor: u32,

    /// Embedded images narrower than this are upscaled.
    pub embedded_min_width: u32,

    /// Embedded images shorter than this are upscaled.
    pub embedded_min_height: u32,

    /// Upscale factor for the page raster.
    pub page_upscale_factor: u32,

    /// Page rasters with a side below this are upscaled.
    pub page_min_side: u32,

    /// Upscaling is skipped when the result would exceed this many pixels.
    pub max_upscaled_pixels: u64,

    /// Local window for adaptive binarization.
    pub adaptive_block_size: u32,

    /// Offset subtracted from the local mean during binarization.
    pub adaptive_offset: i32,

    /// Scan undecoded document bytes for identifier patterns as a last resort.
    pub scan_raw_bytes: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_decode_attempts: 512,
            glyph_confidence_floor: GLYPH_CONFIDENCE_FLOOR,
            barcode_image_upscale_factor: 4,
            embedded_upscale_factor: 3,
            embedded_min_width: 500,
            embedded_min_height: 200,
            page_upscale_factor: 3,
            page_min_side: 1000,
            max_upscaled_pixels: 40_000_000,
            adaptive_block_size: 15,
            adaptive_offset: 10,
            scan_raw_bytes: true,
        }
    }
}

impl LevhaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LevhaConfig =
            serde_json::from_str(r#"{"recovery": {"max_decode_attempts": 8}, "debug": true}"#)
                .unwrap();

        assert_eq!(config.recovery.max_decode_attempts, 8);
        assert_eq!(config.recovery.glyph_confidence_floor, GLYPH_CONFIDENCE_FLOOR);
        assert_eq!(config.extraction.tax_base_floor, TAX_BASE_FLOOR);
        assert!(config.debug);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = std::env::temp_dir().join(format!("levha-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = LevhaConfig::default();
        config.pdf.max_pages = 2;
        config.save(&path).unwrap();

        assert_eq!(LevhaConfig::from_file(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

//! Document container access.

mod document;
pub mod raster;

pub use document::PdfDocument;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Read-only view of a loaded document.
///
/// Text recovery and identifier recovery only go through this trait, so tests
/// can drive them with in-memory fixtures.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Decompressed content stream bytes of a page (1-indexed).
    fn page_content(&self, page: u32) -> Result<Vec<u8>>;

    /// Decodable embedded images of a page, in resource order.
    fn page_images(&self, page: u32) -> Vec<DynamicImage>;

    /// Decodable embedded images of the whole document, page by page.
    fn embedded_images(&self) -> Vec<DynamicImage> {
        (1..=self.page_count())
            .flat_map(|page| self.page_images(page))
            .collect()
    }

    /// Best available raster of the first page.
    ///
    /// Without a renderer this is the largest image drawn on page 1.
    fn page_raster(&self) -> Option<DynamicImage> {
        self.page_images(1)
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
    }

    /// Text layer produced by a general-purpose extractor.
    fn text_layer(&self) -> Result<String>;

    /// Undecoded document bytes.
    fn raw_bytes(&self) -> &[u8];
}

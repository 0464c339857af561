//! Layout regions of a tax plate page, as fractions of the page size.

use image::{DynamicImage, GenericImageView};

/// Rectangle in fractional page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub name: &'static str,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CropRegion {
    pub const fn new(name: &'static str, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            name,
            left,
            top,
            right,
            bottom,
        }
    }

    /// Pixel bounds `(x, y, width, height)` inside a `width x height` image.
    ///
    /// `None` when the region is empty after clamping.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let at = |dim: u32, fraction: f64| ((f64::from(dim) * fraction.clamp(0.0, 1.0)) as u32).min(dim);

        let (x0, x1) = (at(width, self.left), at(width, self.right));
        let (y0, y1) = (at(height, self.top), at(height, self.bottom));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }

    /// Crop this region out of `image`.
    pub fn crop(&self, image: &DynamicImage) -> Option<DynamicImage> {
        let (width, height) = image.dimensions();
        let (x, y, w, h) = self.pixel_bounds(width, height)?;
        Some(image.crop_imm(x, y, w, h))
    }
}

/// Approval-code area in the lower right corner, where the barcode sits.
pub const BARCODE_AREA: CropRegion = CropRegion::new("barcode_area", 0.60, 0.70, 0.98, 0.98);

/// Wider windows tried after [`BARCODE_AREA`], most specific first.
pub const BARCODE_FALLBACK_AREAS: [CropRegion; 4] = [
    CropRegion::new("bottom_right_quadrant", 0.55, 0.65, 0.99, 0.99),
    CropRegion::new("right_third_bottom_half", 0.65, 0.50, 1.0, 1.0),
    CropRegion::new("right_half", 0.50, 0.0, 1.0, 1.0),
    CropRegion::new("bottom_half", 0.0, 0.50, 1.0, 1.0),
];

/// Printed identifier text near the top right.
pub const IDENTIFIER_TEXT_AREA: CropRegion = CropRegion::new("identifier_text", 0.55, 0.10, 0.98, 0.35);

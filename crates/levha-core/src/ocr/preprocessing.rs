//! Raster preprocessing for barcode decoding and glyph recognition.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

/// Rotation applied before a decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// All rotations in scan order.
    pub const ALL: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270];

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image.clone(),
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        }
    }
}

/// Upscale by an integer factor with nearest-neighbor sampling, keeping bar
/// edges hard.
///
/// Returns `None` when the result would exceed `max_pixels`.
pub fn upscale(image: &DynamicImage, factor: u32, max_pixels: u64) -> Option<DynamicImage> {
    let (width, height) = image.dimensions();
    let new_width = width.checked_mul(factor)?;
    let new_height = height.checked_mul(factor)?;
    if u64::from(new_width) * u64::from(new_height) > max_pixels {
        debug!(
            "Skipping upscale of {}x{} by {}: over pixel limit",
            width, height, factor
        );
        return None;
    }
    Some(image.resize_exact(new_width, new_height, FilterType::Nearest))
}

/// Hard threshold at mid-gray for high-contrast barcode bars.
pub fn threshold_enhance(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel[0] = if pixel[0] > 128 { 255 } else { 0 };
    }
    gray
}

/// Binarize against the local mean of a `block_size` window.
///
/// Pixels darker than `mean - offset` become black (0), others white (255).
pub fn adaptive_binarize(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return result;
    }

    let integral = IntegralImage::new(image);
    let half_block = block_size / 2;

    for y in 0..height {
        for x in 0..width {
            let x_start = x.saturating_sub(half_block);
            let y_start = y.saturating_sub(half_block);
            let x_end = (x + half_block + 1).min(width);
            let y_end = (y + half_block + 1).min(height);

            let sum = integral.sum(x_start, y_start, x_end, y_end);
            let count = u64::from(x_end - x_start) * u64::from(y_end - y_start);
            let threshold = (sum / count) as i64 - i64::from(offset);

            let value = i64::from(image.get_pixel(x, y)[0]);
            let output = if value < threshold { 0 } else { 255 };
            result.put_pixel(x, y, Luma([output]));
        }
    }

    result
}

/// Summed-area table over a grayscale image.
struct IntegralImage {
    width: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let mut row = 0u64;
            for x in 0..width {
                row += u64::from(image.get_pixel(x as u32, y as u32)[0]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        Self { width, sums }
    }

    /// Sum over `[x0, x1) x [y0, y1)`.
    fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let stride = self.width + 1;
        let at = |x: u32, y: u32| self.sums[y as usize * stride + x as usize];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rotation_dimensions() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(40, 10));
        assert_eq!(Rotation::Cw90.apply(&image).dimensions(), (10, 40));
        assert_eq!(Rotation::Cw180.apply(&image).dimensions(), (40, 10));
        assert_eq!(Rotation::ALL.map(Rotation::degrees), [0, 90, 180, 270]);
    }

    #[test]
    fn test_upscale_respects_limit() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(100, 50));
        assert_eq!(upscale(&image, 3, 1_000_000).unwrap().dimensions(), (300, 150));
        assert!(upscale(&image, 3, 10_000).is_none());
    }

    #[test]
    fn test_upscale_keeps_binary_levels() {
        let bars = GrayImage::from_fn(8, 2, |x, _| if x % 2 == 0 { Luma([0]) } else { Luma([255]) });
        let scaled = upscale(&DynamicImage::ImageLuma8(bars), 4, 1_000_000).unwrap().to_luma8();

        assert_eq!(scaled.dimensions(), (32, 8));
        assert!(scaled.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(scaled.get_pixel(0, 0)[0], 0);
        assert_eq!(scaled.get_pixel(31, 7)[0], 255);
    }

    #[test]
    fn test_threshold_enhance() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_raw(3, 1, vec![10, 128, 129]).unwrap());
        assert_eq!(threshold_enhance(&image).into_raw(), vec![0, 0, 255]);
    }

    #[test]
    fn test_adaptive_binarize_dark_stroke() {
        // White field with a dark vertical stroke in column 5
        let image = GrayImage::from_fn(11, 11, |x, _| if x == 5 { Luma([20]) } else { Luma([230]) });
        let binary = adaptive_binarize(&image, 15, 10);

        assert_eq!(binary.get_pixel(5, 5)[0], 0);
        assert_eq!(binary.get_pixel(0, 5)[0], 255);
        assert_eq!(binary.get_pixel(10, 0)[0], 255);
    }

    #[test]
    fn test_uniform_image_stays_white() {
        let image = GrayImage::from_pixel(8, 8, Luma([100]));
        let binary = adaptive_binarize(&image, 15, 10);
        assert!(binary.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_integral_sum_matches_direct() {
        let image = GrayImage::from_fn(5, 4, |x, y| Luma([(x * 10 + y) as u8]));
        let integral = IntegralImage::new(&image);
        let direct: u64 = (1..4)
            .flat_map(|y| (2..5).map(move |x| (x, y)))
            .map(|(x, y)| u64::from(image.get_pixel(x, y)[0]))
            .sum();
        assert_eq!(integral.sum(2, 1, 5, 4), direct);
    }
}

//! Linear barcode scanning.

use std::panic::{catch_unwind, AssertUnwindSafe};

use image::{DynamicImage, GrayImage};
use rxing::common::HybridBinarizer;
use rxing::oned::{
    CodaBarReader, Code128Reader, Code39Reader, EAN13Reader, EAN8Reader, ITFReader, UPCAReader,
    UPCEReader,
};
use rxing::{BinaryBitmap, Luma8LuminanceSource, Reader};
use tracing::{debug, trace};

use super::pipeline::AttemptBudget;
use super::validate::identifier_from_text;
use crate::ocr::{threshold_enhance, Rotation};

/// Supported 1D symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Code128,
    Code39,
    Ean13,
    Ean8,
    Itf,
    Codabar,
    UpcA,
    UpcE,
}

impl Symbology {
    /// Reader order for general scans, Code-128 first.
    pub const LINEAR: [Symbology; 8] = [
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Itf,
        Symbology::Codabar,
        Symbology::UpcA,
        Symbology::UpcE,
    ];
}

/// Decodes one symbology from a grayscale image.
pub trait BarcodeReader: Send + Sync {
    fn decode(&self, image: &GrayImage, symbology: Symbology) -> Option<String>;
}

/// [`BarcodeReader`] backed by rxing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingBarcodeReader;

impl BarcodeReader for RxingBarcodeReader {
    fn decode(&self, image: &GrayImage, symbology: Symbology) -> Option<String> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        let result = catch_unwind(AssertUnwindSafe(|| match symbology {
            Symbology::Code128 => decode_with(Code128Reader::default(), image),
            Symbology::Code39 => decode_with(Code39Reader::default(), image),
            Symbology::Ean13 => decode_with(EAN13Reader::default(), image),
            Symbology::Ean8 => decode_with(EAN8Reader::default(), image),
            Symbology::Itf => decode_with(ITFReader::default(), image),
            Symbology::Codabar => decode_with(CodaBarReader::default(), image),
            Symbology::UpcA => decode_with(UPCAReader::default(), image),
            Symbology::UpcE => decode_with(UPCEReader::default(), image),
        }));

        match result {
            Ok(text) => text,
            Err(_) => {
                debug!("Barcode reader panicked on {:?}", symbology);
                None
            }
        }
    }
}

fn decode_with<R: Reader>(mut reader: R, image: &GrayImage) -> Option<String> {
    let source = Luma8LuminanceSource::new(image.as_raw().clone(), image.width(), image.height());
    let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
    reader
        .decode(&mut bitmap)
        .ok()
        .map(|result| result.getText().to_string())
}

/// Code-128 scan over all rotations, each on the image then a
/// threshold-enhanced copy.
pub fn scan_code128(
    reader: &dyn BarcodeReader,
    image: &DynamicImage,
    budget: &mut AttemptBudget,
) -> Option<String> {
    for rotation in Rotation::ALL {
        if budget.is_exhausted() {
            return None;
        }
        let rotated = rotation.apply(image);

        let gray = rotated.to_luma8();
        if let Some(id) = attempt(reader, &gray, Symbology::Code128, rotation, budget) {
            return Some(id);
        }

        let enhanced = threshold_enhance(&rotated);
        if let Some(id) = attempt(reader, &enhanced, Symbology::Code128, rotation, budget) {
            return Some(id);
        }
    }
    None
}

/// Scan with every linear symbology over all rotations.
pub fn scan_linear(
    reader: &dyn BarcodeReader,
    image: &DynamicImage,
    budget: &mut AttemptBudget,
) -> Option<String> {
    for rotation in Rotation::ALL {
        if budget.is_exhausted() {
            return None;
        }
        let gray = rotation.apply(image).to_luma8();
        for symbology in Symbology::LINEAR {
            if let Some(id) = attempt(reader, &gray, symbology, rotation, budget) {
                return Some(id);
            }
        }
    }
    None
}

fn attempt(
    reader: &dyn BarcodeReader,
    image: &GrayImage,
    symbology: Symbology,
    rotation: Rotation,
    budget: &mut AttemptBudget,
) -> Option<String> {
    if !budget.try_take() {
        return None;
    }
    let text = reader.decode(image, symbology)?;
    trace!(
        "Decoded {:?} at {} degrees: {:?}",
        symbology,
        rotation.degrees(),
        text
    );
    identifier_from_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use pretty_assertions::assert_eq;

    /// Decodes only images that are taller than wide, i.e. rotated a wide input.
    struct TallOnly;

    impl BarcodeReader for TallOnly {
        fn decode(&self, image: &GrayImage, symbology: Symbology) -> Option<String> {
            (image.height() > image.width() && symbology == Symbology::Code128)
                .then(|| "8589706200".to_string())
        }
    }

    /// Decodes only pure black and white images.
    struct BinaryOnly;

    impl BarcodeReader for BinaryOnly {
        fn decode(&self, image: &GrayImage, _: Symbology) -> Option<String> {
            image
                .pixels()
                .all(|p| p[0] == 0 || p[0] == 255)
                .then(|| "VKN 1222153986".to_string())
        }
    }

    /// Decodes a symbology other than Code-128 only.
    struct EanOnly;

    impl BarcodeReader for EanOnly {
        fn decode(&self, _: &GrayImage, symbology: Symbology) -> Option<String> {
            (symbology == Symbology::Ean13).then(|| "1222153986".to_string())
        }
    }

    fn wide_gray() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 10, Luma([90])))
    }

    #[test]
    fn test_rotation_is_tried() {
        let mut budget = AttemptBudget::new(100);
        let found = scan_code128(&TallOnly, &wide_gray(), &mut budget);

        assert_eq!(found.as_deref(), Some("8589706200"));
        // original + enhanced at 0 degrees, then original at 90
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn test_enhanced_copy_is_tried() {
        let mut budget = AttemptBudget::new(100);
        let found = scan_code128(&BinaryOnly, &wide_gray(), &mut budget);

        assert_eq!(found.as_deref(), Some("1222153986"));
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_linear_scan_tries_other_symbologies() {
        let mut budget = AttemptBudget::new(100);
        assert_eq!(
            scan_linear(&EanOnly, &wide_gray(), &mut budget).as_deref(),
            Some("1222153986")
        );
        assert_eq!(budget.used(), 3);

        let mut budget = AttemptBudget::new(100);
        assert_eq!(scan_code128(&EanOnly, &wide_gray(), &mut budget), None);
        assert_eq!(budget.used(), 8);
    }

    #[test]
    fn test_budget_limits_scan() {
        let mut budget = AttemptBudget::new(2);
        assert_eq!(scan_linear(&TallOnly, &wide_gray(), &mut budget), None);
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_rxing_reader_on_blank_image() {
        let blank = GrayImage::from_pixel(120, 40, Luma([255]));
        assert_eq!(RxingBarcodeReader.decode(&blank, Symbology::Code128), None);
        assert_eq!(RxingBarcodeReader.decode(&GrayImage::new(0, 0), Symbology::Ean13), None);
    }
}

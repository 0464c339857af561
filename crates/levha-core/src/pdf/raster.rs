//! Decoding of embedded image XObjects into rasters.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::trace;

/// Colour model of an uncompressed image stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    fn channels(self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

/// Layout of an uncompressed image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterMeta {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color: ColorModel,
    /// `/Decode [1 0]` on a single-channel image.
    pub inverted: bool,
}

impl RasterMeta {
    /// Bytes needed for the pixel data, with per-row byte alignment.
    pub fn expected_byte_count(&self) -> usize {
        let bits_per_row =
            self.width as usize * self.color.channels() * self.bits_per_component as usize;
        bits_per_row.div_ceil(8) * self.height as usize
    }

    /// Read the layout from an image dictionary.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Option<Self> {
        let width = dict.get(b"Width").ok()?.as_i64().ok()?;
        let height = dict.get(b"Height").ok()?.as_i64().ok()?;
        if width <= 0 || height <= 0 {
            return None;
        }

        let image_mask = dict
            .get(b"ImageMask")
            .ok()
            .and_then(|o| o.as_bool().ok())
            .unwrap_or(false);

        let (color, bits_per_component) = if image_mask {
            (ColorModel::Gray, 1)
        } else {
            let bits = dict
                .get(b"BitsPerComponent")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(8) as u8;
            (color_model(doc, dict)?, bits)
        };

        if !matches!(bits_per_component, 1 | 2 | 4 | 8) {
            trace!("Unsupported bits per component: {}", bits_per_component);
            return None;
        }

        let inverted = color == ColorModel::Gray && decode_is_inverted(dict);

        Some(Self {
            width: width as u32,
            height: height as u32,
            bits_per_component,
            color,
            inverted,
        })
    }
}

fn color_model(doc: &Document, dict: &Dictionary) -> Option<ColorModel> {
    let object = dict.get(b"ColorSpace").ok()?;
    let (_, object) = doc.dereference(object).ok()?;
    match object {
        Object::Name(name) => model_from_name(name),
        Object::Array(items) => {
            let family = items.first()?.as_name().ok()?;
            if family == b"ICCBased" {
                let (_, profile) = doc.dereference(items.get(1)?).ok()?;
                let components = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                match components {
                    1 => Some(ColorModel::Gray),
                    3 => Some(ColorModel::Rgb),
                    4 => Some(ColorModel::Cmyk),
                    _ => None,
                }
            } else {
                model_from_name(family)
            }
        }
        _ => None,
    }
}

fn model_from_name(name: &[u8]) -> Option<ColorModel> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Some(ColorModel::Gray),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorModel::Rgb),
        b"DeviceCMYK" | b"CMYK" => Some(ColorModel::Cmyk),
        _ => None,
    }
}

fn decode_is_inverted(dict: &Dictionary) -> bool {
    let Ok(Object::Array(values)) = dict.get(b"Decode") else {
        return false;
    };
    let first = values.first().and_then(|o| o.as_float().ok());
    let second = values.get(1).and_then(|o| o.as_float().ok());
    matches!((first, second), (Some(a), Some(b)) if a > b)
}

/// Detect an encoded image container from its magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() < 8 {
        return None;
    }
    if bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return Some(ImageFormat::Jpeg);
    }
    if bytes[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(ImageFormat::Png);
    }
    if &bytes[..6] == b"GIF87a" || &bytes[..6] == b"GIF89a" {
        return Some(ImageFormat::Gif);
    }
    if bytes[..4] == [0x49, 0x49, 0x2A, 0x00] || bytes[..4] == [0x4D, 0x4D, 0x00, 0x2A] {
        return Some(ImageFormat::Tiff);
    }
    if bytes[..2] == *b"BM" {
        return Some(ImageFormat::Bmp);
    }
    None
}

/// Decode an image XObject stream.
///
/// JPEG streams are decoded from their raw content; JPEG 2000, CCITT and
/// JBIG2 are not supported.
pub fn decode_image_stream(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    match filter_name(dict) {
        Some(b"DCTDecode") => {
            trace!("Decoding JPEG image");
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping image with unsupported filter");
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    if let Some(format) = detect_format(&data) {
        return image::load_from_memory_with_format(&data, format).ok();
    }

    let meta = RasterMeta::from_dict(doc, dict)?;
    decode_raw(&meta, &data)
}

fn filter_name(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

/// Build a raster from uncompressed pixel data.
pub fn decode_raw(meta: &RasterMeta, data: &[u8]) -> Option<DynamicImage> {
    let expected = meta.expected_byte_count();
    if data.len() < expected {
        trace!(
            "Raster data too short: {} < {} for {}x{}",
            data.len(),
            expected,
            meta.width,
            meta.height
        );
        return None;
    }
    let data = &data[..expected];

    let mut samples = if meta.bits_per_component < 8 {
        expand_sub_byte_pixels(data, meta)
    } else {
        data.to_vec()
    };

    match meta.color {
        ColorModel::Gray => {
            if meta.inverted {
                samples.iter_mut().for_each(|s| *s = 255 - *s);
            }
            GrayImage::from_raw(meta.width, meta.height, samples).map(DynamicImage::ImageLuma8)
        }
        ColorModel::Rgb => {
            RgbImage::from_raw(meta.width, meta.height, samples).map(DynamicImage::ImageRgb8)
        }
        ColorModel::Cmyk => RgbImage::from_raw(meta.width, meta.height, cmyk_to_rgb(&samples))
            .map(DynamicImage::ImageRgb8),
    }
}

/// Expand 1, 2 or 4 bit samples to 8 bits.
pub fn expand_sub_byte_pixels(data: &[u8], meta: &RasterMeta) -> Vec<u8> {
    let samples_per_row = meta.width as usize * meta.color.channels();
    let bpc = meta.bits_per_component;
    let bytes_per_row = (samples_per_row * bpc as usize).div_ceil(8);
    let max_value = (1u16 << bpc) - 1;
    let per_byte = 8 / bpc as usize;

    let mut out = Vec::with_capacity(samples_per_row * meta.height as usize);
    for row in data.chunks(bytes_per_row).take(meta.height as usize) {
        let mut written = 0;
        'row: for &byte in row {
            for i in 0..per_byte {
                if written >= samples_per_row {
                    break 'row;
                }
                let shift = 8 - bpc * (i as u8 + 1);
                let value = (byte >> shift) & (max_value as u8);
                out.push((u16::from(value) * 255 / max_value) as u8);
                written += 1;
            }
        }
    }
    out
}

/// Naive CMYK to RGB conversion.
pub fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for pixel in cmyk.chunks_exact(4) {
        let k = u16::from(pixel[3]);
        for &channel in &pixel[..3] {
            rgb.push(255u16.saturating_sub((u16::from(channel) + k).min(255)) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use pretty_assertions::assert_eq;

    fn gray_meta(width: u32, height: u32, bits: u8) -> RasterMeta {
        RasterMeta {
            width,
            height,
            bits_per_component: bits,
            color: ColorModel::Gray,
            inverted: false,
        }
    }

    #[test]
    fn test_expected_byte_count_aligns_rows() {
        assert_eq!(gray_meta(10, 2, 1).expected_byte_count(), 4);
        assert_eq!(gray_meta(10, 2, 8).expected_byte_count(), 20);
    }

    #[test]
    fn test_one_bit_rows_expand() {
        let meta = gray_meta(3, 2, 1);
        let pixels = expand_sub_byte_pixels(&[0b1010_0000, 0b0110_0000], &meta);
        assert_eq!(pixels, vec![255, 0, 255, 0, 255, 255]);
    }

    #[test]
    fn test_inverted_gray() {
        let meta = RasterMeta {
            inverted: true,
            ..gray_meta(2, 1, 8)
        };
        let image = decode_raw(&meta, &[0, 200]).unwrap();
        assert_eq!(image.to_luma8().into_raw(), vec![255, 55]);
    }

    #[test]
    fn test_short_data_rejected() {
        assert!(decode_raw(&gray_meta(4, 4, 8), &[0; 10]).is_none());
    }

    #[test]
    fn test_cmyk_conversion() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0, 255, 0, 0, 0]), vec![255, 255, 255, 0, 255, 255]);
        let meta = RasterMeta {
            color: ColorModel::Cmyk,
            ..gray_meta(1, 1, 8)
        };
        assert_eq!(decode_raw(&meta, &[0, 0, 0, 255]).unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]), Some(ImageFormat::Jpeg));
        assert_eq!(detect_format(b"not an image"), None);
    }
}

//! Shared fixtures: synthetic PDFs and rendered barcodes.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use lopdf::{dictionary, Document, Object, Stream};

/// Code-128 bar/space widths by symbol value; 106 is the stop pattern.
const CODE128_PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const START_C: usize = 105;
const STOP: usize = 106;

/// Render an even-length digit string as a Code-128 set C symbol.
pub fn code128_c(digits: &str, module: u32, height: u32) -> GrayImage {
    assert!(digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_digit()));

    let mut values = vec![START_C];
    for pair in digits.as_bytes().chunks(2) {
        values.push(usize::from((pair[0] - b'0') * 10 + (pair[1] - b'0')));
    }
    let checksum = values
        .iter()
        .enumerate()
        .map(|(i, &v)| if i == 0 { v } else { v * i })
        .sum::<usize>()
        % 103;
    values.push(checksum);
    values.push(STOP);

    let widths: Vec<u32> = values
        .iter()
        .flat_map(|&v| CODE128_PATTERNS[v].bytes().map(|b| u32::from(b - b'0')))
        .collect();

    let quiet = 10 * module;
    let total: u32 = widths.iter().sum::<u32>() * module + 2 * quiet;
    let mut image = GrayImage::from_pixel(total, height, Luma([255]));

    let mut x = quiet;
    for (i, width) in widths.iter().enumerate() {
        let span = width * module;
        if i % 2 == 0 {
            for xx in x..x + span {
                for y in 0..height {
                    image.put_pixel(xx, y, Luma([0]));
                }
            }
        }
        x += span;
    }
    image
}

/// Single-page PDF with raw content bytes and an optional gray image.
pub fn pdf_with(content: &[u8], image: Option<&GrayImage>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = lopdf::Dictionary::new();
    if let Some(image) = image {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            image.as_raw().clone(),
        ));
        xobjects.set("Im0", image_id);
    }

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => xobjects },
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// UTF-16BE hex string with a byte-order mark, as written by some PDF producers.
pub fn utf16_hex(text: &str) -> String {
    let mut hex = String::from("FEFF");
    for unit in text.encode_utf16() {
        hex.push_str(&format!("{:04X}", unit));
    }
    hex
}

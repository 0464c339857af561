//! Glyph segmentation of binarized images.

use image::{GrayImage, Luma};

/// Minimum component size kept by [`find_components`].
const MIN_COMPONENT_WIDTH: u32 = 3;
const MIN_COMPONENT_HEIGHT: u32 = 5;

/// Padding around a glyph before classification.
const GLYPH_PADDING: u32 = 4;

/// Axis-aligned bounding box of a glyph candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphBox {
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// 4-connected components of black (0) pixels.
pub fn find_components(binary: &GrayImage) -> Vec<GlyphBox> {
    let (width, height) = binary.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut visited = vec![false; w * h];
    let mut boxes = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if visited[y * w + x] {
                continue;
            }
            if binary.get_pixel(x as u32, y as u32)[0] == 0 {
                let glyph = flood_fill(binary, &mut visited, x, y);
                if glyph.width >= MIN_COMPONENT_WIDTH && glyph.height >= MIN_COMPONENT_HEIGHT {
                    boxes.push(glyph);
                }
            }
            visited[y * w + x] = true;
        }
    }

    boxes
}

fn flood_fill(binary: &GrayImage, visited: &mut [bool], start_x: usize, start_y: usize) -> GlyphBox {
    let (w, h) = (binary.width() as usize, binary.height() as usize);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (start_x, start_y, start_x, start_y);
    let mut stack = vec![(start_x, start_y)];

    while let Some((x, y)) = stack.pop() {
        let idx = y * w + x;
        if visited[idx] || binary.get_pixel(x as u32, y as u32)[0] != 0 {
            continue;
        }
        visited[idx] = true;

        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < w {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < h {
            stack.push((x, y + 1));
        }
    }

    GlyphBox {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

/// Keep boxes shaped like printed digits.
pub fn filter_digit_boxes(boxes: Vec<GlyphBox>, image_width: u32, image_height: u32) -> Vec<GlyphBox> {
    boxes
        .into_iter()
        .filter(|b| {
            let aspect = b.aspect_ratio();
            (0.15..=1.5).contains(&aspect)
                && b.width >= 5
                && b.height >= 8
                && b.width <= image_width / 3
                && b.height <= image_height / 2
        })
        .collect()
}

/// Reading order: rows top to bottom, boxes left to right within a row.
///
/// A box joins the current row when its top edge is within a quarter of the
/// combined height of the row's first box.
pub fn order_boxes(mut boxes: Vec<GlyphBox>) -> Vec<GlyphBox> {
    boxes.sort_by_key(|b| (b.y, b.x));

    let mut rows: Vec<Vec<GlyphBox>> = Vec::new();
    for glyph in boxes {
        match rows.last_mut() {
            Some(row) if same_row(&row[0], &glyph) => row.push(glyph),
            _ => rows.push(vec![glyph]),
        }
    }

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by_key(|b| b.x);
            row
        })
        .collect()
}

fn same_row(first: &GlyphBox, glyph: &GlyphBox) -> bool {
    let threshold = (first.height + glyph.height) / 4;
    first.y.abs_diff(glyph.y) < threshold
}

/// Copy a glyph into a padded white square, centered.
pub fn extract_glyph(binary: &GrayImage, glyph: &GlyphBox) -> GrayImage {
    let size = (glyph.width + 2 * GLYPH_PADDING).max(glyph.height + 2 * GLYPH_PADDING);
    let mut out = GrayImage::from_pixel(size, size, Luma([255]));

    let offset_x = (size - glyph.width) / 2;
    let offset_y = (size - glyph.height) / 2;

    for dy in 0..glyph.height {
        for dx in 0..glyph.width {
            let (sx, sy) = (glyph.x + dx, glyph.y + dy);
            if sx < binary.width() && sy < binary.height() {
                out.put_pixel(offset_x + dx, offset_y + dy, *binary.get_pixel(sx, sy));
            }
        }
    }

    out
}

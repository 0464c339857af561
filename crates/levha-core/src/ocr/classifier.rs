//! Hand-tuned digit classifier.
//!
//! Each glyph is reduced to ten shape features which are compared against
//! a fixed reference profile per digit.

use image::GrayImage;

/// Pixels above this value are background.
const BACKGROUND_LEVEL: u8 = 128;

/// Classifies a single glyph image as a digit.
pub trait GlyphClassifier: Send + Sync {
    /// Returns the digit (0-9) and a confidence in `[0, 1]`.
    fn classify(&self, glyph: &GrayImage) -> (u8, f32);
}

/// Shape features of a glyph, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DigitFeatures {
    pub horizontal_symmetry: f64,
    pub vertical_symmetry: f64,
    pub top_heavy: f64,
    pub bottom_heavy: f64,
    pub left_heavy: f64,
    pub right_heavy: f64,
    pub center_density: f64,
    pub aspect_ratio: f64,
    pub holes: f64,
    pub crossings: f64,
}

const fn profile(values: [f64; 10]) -> DigitFeatures {
    DigitFeatures {
        horizontal_symmetry: values[0],
        vertical_symmetry: values[1],
        top_heavy: values[2],
        bottom_heavy: values[3],
        left_heavy: values[4],
        right_heavy: values[5],
        center_density: values[6],
        aspect_ratio: values[7],
        holes: values[8],
        crossings: values[9],
    }
}

/// Reference features for digits 0 through 9.
pub const REFERENCE_PROFILES: [DigitFeatures; 10] = [
    profile([0.8, 0.7, 0.5, 0.5, 0.5, 0.5, 0.3, 0.7, 1.0, 0.4]),
    profile([0.6, 0.5, 0.5, 0.5, 0.3, 0.6, 0.7, 0.3, 0.0, 0.2]),
    profile([0.4, 0.3, 0.6, 0.5, 0.4, 0.5, 0.4, 0.6, 0.0, 0.5]),
    profile([0.3, 0.5, 0.5, 0.5, 0.3, 0.7, 0.4, 0.6, 0.0, 0.6]),
    profile([0.4, 0.4, 0.6, 0.4, 0.4, 0.6, 0.5, 0.6, 0.0, 0.5]),
    profile([0.4, 0.4, 0.55, 0.45, 0.5, 0.5, 0.45, 0.6, 0.0, 0.5]),
    profile([0.5, 0.4, 0.4, 0.6, 0.55, 0.45, 0.5, 0.6, 0.8, 0.5]),
    profile([0.4, 0.3, 0.7, 0.3, 0.4, 0.6, 0.35, 0.6, 0.0, 0.3]),
    profile([0.85, 0.7, 0.5, 0.5, 0.5, 0.5, 0.4, 0.65, 1.0, 0.6]),
    profile([0.5, 0.4, 0.6, 0.4, 0.45, 0.55, 0.5, 0.6, 0.8, 0.5]),
];

/// Nearest-profile digit classifier.
#[derive(Debug, Clone)]
pub struct DigitClassifier {
    profiles: [DigitFeatures; 10],
}

impl DigitClassifier {
    pub fn new() -> Self {
        Self {
            profiles: REFERENCE_PROFILES,
        }
    }

    /// Replace the reference profiles.
    pub fn with_profiles(profiles: [DigitFeatures; 10]) -> Self {
        Self { profiles }
    }

    /// Best matching digit for precomputed features.
    ///
    /// Ties go to the lower digit.
    pub fn best_match(&self, features: &DigitFeatures) -> (u8, f32) {
        let mut best_digit = 0u8;
        let mut best_score = f64::NEG_INFINITY;

        for (digit, reference) in self.profiles.iter().enumerate() {
            let score = match_score(features, reference);
            if score > best_score {
                best_score = score;
                best_digit = digit as u8;
            }
        }

        (best_digit, best_score.clamp(0.0, 1.0) as f32)
    }
}

impl Default for DigitClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphClassifier for DigitClassifier {
    fn classify(&self, glyph: &GrayImage) -> (u8, f32) {
        self.best_match(&extract_features(glyph))
    }
}

/// Similarity in `[0, 1]`; holes weigh 1.5 and aspect ratio 0.5.
pub fn match_score(features: &DigitFeatures, reference: &DigitFeatures) -> f64 {
    let closeness = |a: f64, b: f64| 1.0 - (a - b).abs();

    let score = closeness(features.horizontal_symmetry, reference.horizontal_symmetry)
        + closeness(features.vertical_symmetry, reference.vertical_symmetry)
        + closeness(features.top_heavy, reference.top_heavy)
        + closeness(features.bottom_heavy, reference.bottom_heavy)
        + closeness(features.left_heavy, reference.left_heavy)
        + closeness(features.right_heavy, reference.right_heavy)
        + closeness(features.center_density, reference.center_density)
        + closeness(features.aspect_ratio, reference.aspect_ratio) * 0.5
        + closeness(features.holes, reference.holes) * 1.5
        + closeness(features.crossings, reference.crossings);

    score / 10.0
}

/// Compute the shape features of a glyph image.
pub fn extract_features(glyph: &GrayImage) -> DigitFeatures {
    let (width, height) = glyph.dimensions();
    let mut features = DigitFeatures::default();
    if width == 0 || height == 0 {
        return features;
    }

    let (mid_x, mid_y) = (width / 2, height / 2);
    let (center_x0, center_x1) = (width / 4, 3 * width / 4);
    let (center_y0, center_y1) = (height / 4, 3 * height / 4);

    let mut total = 0.0;
    let (mut top, mut bottom, mut left, mut right, mut center) = (0.0, 0.0, 0.0, 0.0, 0.0);

    for (x, y, pixel) in glyph.enumerate_pixels() {
        let mass = f64::from(255 - pixel[0]) / 255.0;
        total += mass;

        if y < mid_y {
            top += mass;
        } else {
            bottom += mass;
        }
        if x < mid_x {
            left += mass;
        } else {
            right += mass;
        }
        if (center_x0..center_x1).contains(&x) && (center_y0..center_y1).contains(&y) {
            center += mass;
        }
    }

    if total > 0.0 {
        features.top_heavy = top / total;
        features.bottom_heavy = bottom / total;
        features.left_heavy = left / total;
        features.right_heavy = right / total;

        let center_area = f64::from((center_x1 - center_x0) * (center_y1 - center_y0));
        let expected = total * center_area / f64::from(width * height);
        features.center_density = (center / expected).min(1.0);
    }

    features.horizontal_symmetry = horizontal_symmetry(glyph);
    features.vertical_symmetry = vertical_symmetry(glyph);

    let aspect = f64::from(width) / f64::from(height);
    features.aspect_ratio = if aspect > 1.0 { 1.0 / aspect } else { aspect };

    features.holes = (count_holes(glyph) as f64 / 2.0).min(1.0);
    features.crossings = crossings(glyph);

    features
}

/// Mirror similarity across the vertical axis.
fn horizontal_symmetry(glyph: &GrayImage) -> f64 {
    let (width, height) = glyph.dimensions();
    let mut diff = 0.0;
    let mut count = 0u32;

    for y in 0..height {
        for x in 0..width / 2 {
            let a = glyph.get_pixel(x, y)[0];
            let b = glyph.get_pixel(width - 1 - x, y)[0];
            diff += f64::from(a.abs_diff(b)) / 255.0;
            count += 1;
        }
    }

    if count == 0 { 0.0 } else { 1.0 - diff / f64::from(count) }
}

/// Mirror similarity across the horizontal axis.
fn vertical_symmetry(glyph: &GrayImage) -> f64 {
    let (width, height) = glyph.dimensions();
    let mut diff = 0.0;
    let mut count = 0u32;

    for y in 0..height / 2 {
        for x in 0..width {
            let a = glyph.get_pixel(x, y)[0];
            let b = glyph.get_pixel(x, height - 1 - y)[0];
            diff += f64::from(a.abs_diff(b)) / 255.0;
            count += 1;
        }
    }

    if count == 0 { 0.0 } else { 1.0 - diff / f64::from(count) }
}

/// Background regions not connected to the image border.
pub fn count_holes(glyph: &GrayImage) -> usize {
    let (width, height) = glyph.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return 0;
    }
    let mut visited = vec![false; w * h];

    let is_background = |x: usize, y: usize| glyph.get_pixel(x as u32, y as u32)[0] > BACKGROUND_LEVEL;

    let fill = |visited: &mut Vec<bool>, start: (usize, usize)| {
        let mut stack = vec![start];
        while let Some((x, y)) = stack.pop() {
            let idx = y * w + x;
            if visited[idx] || !is_background(x, y) {
                continue;
            }
            visited[idx] = true;
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
    };

    for x in 0..w {
        fill(&mut visited, (x, 0));
        fill(&mut visited, (x, h - 1));
    }
    for y in 0..h {
        fill(&mut visited, (0, y));
        fill(&mut visited, (w - 1, y));
    }

    let mut holes = 0;
    for y in 0..h {
        for x in 0..w {
            if !visited[y * w + x] && is_background(x, y) {
                holes += 1;
                fill(&mut visited, (x, y));
            }
        }
    }
    holes
}

/// Average stroke transitions along sampled rows, scaled by 1/10.
fn crossings(glyph: &GrayImage) -> f64 {
    let (width, height) = glyph.dimensions();
    let step = (height / 8).max(1);

    let mut total = 0u32;
    let mut lines = 0u32;
    let mut y = height / 4;
    while y < 3 * height / 4 {
        let mut in_stroke = false;
        for x in 0..width {
            let foreground = glyph.get_pixel(x, y)[0] < BACKGROUND_LEVEL;
            if foreground != in_stroke {
                total += 1;
                in_stroke = foreground;
            }
        }
        lines += 1;
        y += step;
    }

    if lines == 0 {
        return 0.0;
    }
    (f64::from(total) / f64::from(lines) / 10.0).min(1.0)
}

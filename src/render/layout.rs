//! Text block geometry, word wrapping and colour choice.

use super::face::Face;
use super::BlockStyle;
use image::{Rgb, RgbImage};

/// Character advance assumed when a face cannot measure text, as a
/// fraction of the font size
pub const ESTIMATED_CHAR_WIDTH: f32 = 0.6;
/// Lines may use this fraction of the box width
pub const WRAP_MARGIN: f32 = 0.98;
/// Per-character advance when the font size collapses to zero
const DEGENERATE_CHAR_WIDTH: u32 = 10;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Pixel geometry of one text block on a particular image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    pub font_px: u32,
    pub box_width: u32,
    pub top_y: u32,
}

fn percent_of(total: u32, percent: f32) -> i64 {
    (f64::from(total) * f64::from(percent) / 100.0).round() as i64
}

impl BlockGeometry {
    pub fn derive(image_width: u32, image_height: u32, style: &BlockStyle) -> Self {
        let font_px = percent_of(image_height, style.font_size_percent).max(1);
        let box_width = percent_of(image_width, style.width_percent)
            .min(i64::from(image_width))
            .max(1);
        let top_y = percent_of(image_height, style.top_percent).max(0);
        Self {
            font_px: u32::try_from(font_px).unwrap_or(u32::MAX),
            box_width: u32::try_from(box_width).unwrap_or(u32::MAX),
            top_y: u32::try_from(top_y).unwrap_or(u32::MAX),
        }
    }
}

pub fn estimate_width(text: &str, font_px: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if font_px == 0 {
        return chars.saturating_mul(DEGENERATE_CHAR_WIDTH);
    }
    (chars as f32 * font_px as f32 * ESTIMATED_CHAR_WIDTH) as u32
}

pub fn text_width(face: &dyn Face, text: &str, font_px: u32) -> u32 {
    if text.is_empty() {
        return 0;
    }
    face.measure_width(text)
        .unwrap_or_else(|| estimate_width(text, font_px))
}

/// Greedy word wrap of one newline-free segment. A single word wider than
/// the box is emitted on a line of its own rather than split.
pub fn wrap_segment(segment: &str, face: &dyn Face, font_px: u32, box_width: u32) -> Vec<String> {
    if segment.is_empty() {
        return Vec::new();
    }
    let limit = box_width as f32 * WRAP_MARGIN;
    let fits = |candidate: &str| text_width(face, candidate, font_px) as f32 <= limit;

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in segment.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if fits(&candidate) {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        // Whitespace-only input still occupies a line
        lines.push(String::new());
    }
    lines
}

/// Upper-case `text`, honour explicit line breaks, and wrap each segment
pub fn layout_text(text: &str, face: &dyn Face, geometry: &BlockGeometry) -> Vec<String> {
    text.to_uppercase()
        .split('\n')
        .flat_map(|segment| wrap_segment(segment, face, geometry.font_px, geometry.box_width))
        .collect()
}

/// Vertical advance for one line. Empty lines use the face's real height
/// when it has one.
pub fn line_height(face: &dyn Face, line: &str, font_px: u32, multiplier: f32) -> u32 {
    let base = if line.is_empty() {
        face.metric_height().unwrap_or(font_px as f32)
    } else {
        font_px as f32
    };
    (base * multiplier).max(0.0) as u32
}

pub fn invert(color: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = color.0;
    Rgb([255 - r, 255 - g, 255 - b])
}

/// Colour for a block: the inverse of the pixel under the middle of its
/// first visible line, or white when that pixel can't be read.
pub fn contrast_color(
    canvas: &RgbImage,
    lines: &[String],
    face: &dyn Face,
    geometry: &BlockGeometry,
    multiplier: f32,
    center_x: u32,
) -> Rgb<u8> {
    let Some(first) = lines.iter().find(|line| !line.is_empty()) else {
        return WHITE;
    };
    let (width, height) = canvas.dimensions();
    let half_line = line_height(face, first, geometry.font_px, multiplier) / 2;
    let x = center_x.min(width.saturating_sub(1));
    let y = geometry
        .top_y
        .saturating_add(half_line)
        .min(height.saturating_sub(1));

    canvas
        .get_pixel_checked(x, y)
        .map(|pixel| invert(*pixel))
        .unwrap_or(WHITE)
}

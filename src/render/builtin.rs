//! Built-in 5x7 bitmap glyphs used when no font file can be loaded.
//!
//! Captions are upper-cased before layout, so only capitals, digits and
//! common punctuation are covered. Anything else is drawn as a hollow box.

use super::face::{DrawError, Face};
use super::layout::ESTIMATED_CHAR_WIDTH;
use image::{Rgb, RgbImage};

const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: u32 = 5;
/// Glyph cell is 6 units wide (5 + 1 spacing) and a unit is a tenth of the
/// font size, so the drawn width matches the width estimate.
const UNITS_PER_PX: f32 = 10.0;
const CELL_UNITS: f32 = ESTIMATED_CHAR_WIDTH * UNITS_PER_PX;

const MISSING: [u8; GLYPH_ROWS] = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match c {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '"' => [0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ';' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        '$' => [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04],
        '@' => [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        _ => return None,
    };
    Some(rows)
}

/// Blocky fallback face. It exposes no metrics, so layout runs on the
/// size-based width and height estimates.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFace {
    font_px: u32,
}

impl BuiltinFace {
    pub fn new(font_px: u32) -> Self {
        Self {
            font_px: font_px.max(1),
        }
    }

    fn unit(&self) -> f32 {
        self.font_px as f32 / UNITS_PER_PX
    }
}

/// Fill the unit-sized square at (`x`, `y`) in pixel space, clipped to the canvas
fn fill_unit(canvas: &mut RgbImage, x: f32, y: f32, unit: f32, color: Rgb<u8>) -> bool {
    let (w, h) = canvas.dimensions();
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = ((x + unit).ceil() as i64).max(x0 + 1);
    let y1 = ((y + unit).ceil() as i64).max(y0 + 1);

    let mut painted = false;
    for py in y0.max(0)..y1.min(i64::from(h)) {
        for px in x0.max(0)..x1.min(i64::from(w)) {
            canvas.put_pixel(px as u32, py as u32, color);
            painted = true;
        }
    }
    painted
}

impl Face for BuiltinFace {
    fn measure_width(&self, _text: &str) -> Option<u32> {
        None
    }

    fn metric_height(&self) -> Option<f32> {
        None
    }

    fn draw(
        &self,
        canvas: &mut RgbImage,
        center: (i32, i32),
        text: &str,
        color: Rgb<u8>,
    ) -> Result<(), DrawError> {
        let unit = self.unit();
        let chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
        let width = chars.len() as f32 * CELL_UNITS * unit;
        let left = center.0 as f32 - width / 2.0;
        let top = center.1 as f32 - GLYPH_ROWS as f32 * unit / 2.0;

        let mut painted = false;
        for (i, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let rows = glyph(*c).unwrap_or(MISSING);
            let cell_left = left + i as f32 * CELL_UNITS * unit;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let x = cell_left + col as f32 * unit;
                    let y = top + row as f32 * unit;
                    painted |= fill_unit(canvas, x, y, unit, color);
                }
            }
        }

        if !painted && chars.iter().any(|c| !c.is_whitespace()) {
            return Err(DrawError::OffCanvas);
        }
        Ok(())
    }
}

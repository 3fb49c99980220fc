use super::builtin::BuiltinFace;
use crate::assets::{AssetStore, FontRole};
use crate::error::AssetError;
use ab_glyph::{point, Font, FontArc, Glyph, GlyphId, InvalidFont, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("text lies entirely outside the canvas")]
    OffCanvas,
}

#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("font asset unavailable: {0}")]
    Asset(#[from] AssetError),
    #[error("font data is invalid: {0}")]
    Invalid(#[from] InvalidFont),
    #[error("no font available")]
    Unavailable,
}

/// A font at a fixed pixel size
pub trait Face: Send + Sync {
    /// Advance width of `text` in pixels, if the face can measure it
    fn measure_width(&self, text: &str) -> Option<u32>;

    /// Ascent plus descent in pixels, if the face exposes metrics
    fn metric_height(&self) -> Option<f32>;

    /// Draw `text` with its bounding box centred on `center`
    fn draw(
        &self,
        canvas: &mut RgbImage,
        center: (i32, i32),
        text: &str,
        color: Rgb<u8>,
    ) -> Result<(), DrawError>;
}

/// Loads faces for the title and body blocks
pub trait FontSource {
    fn load(&self, role: FontRole, font_px: u32) -> Result<Box<dyn Face>, FontLoadError>;

    fn fallback(&self, font_px: u32) -> Result<Box<dyn Face>, FontLoadError> {
        Ok(Box::new(BuiltinFace::new(font_px)))
    }
}

/// Fonts read from an [`AssetStore`]
pub struct AssetFonts<'a>(pub &'a dyn AssetStore);

impl FontSource for AssetFonts<'_> {
    fn load(&self, role: FontRole, font_px: u32) -> Result<Box<dyn Face>, FontLoadError> {
        let bytes = self.0.font_bytes(role)?;
        Ok(Box::new(GlyphFace::from_bytes(bytes, font_px)?))
    }
}

/// Outline font rendered with ab_glyph
pub struct GlyphFace {
    font: FontArc,
    scale: PxScale,
}

impl GlyphFace {
    pub fn from_bytes(bytes: Vec<u8>, font_px: u32) -> Result<Self, InvalidFont> {
        let font = FontArc::try_from_vec(bytes)?;
        // Font size is the em size; PxScale is ascent-to-descent height
        let em = font_px.max(1) as f32;
        let scale = match font.units_per_em() {
            Some(units) if units > 0.0 => PxScale::from(em * font.height_unscaled() / units),
            _ => PxScale::from(em),
        };
        Ok(Self { font, scale })
    }

    /// Glyphs laid out on a baseline at y = 0, plus the total advance
    fn layout(&self, text: &str) -> (Vec<Glyph>, f32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());

        for c in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, point(caret, 0.0)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        (glyphs, caret)
    }
}

fn blend(pixel: &mut Rgb<u8>, color: Rgb<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        let mixed = f32::from(src) * alpha + f32::from(*dst) * (1.0 - alpha);
        *dst = mixed.round() as u8;
    }
}

impl Face for GlyphFace {
    fn measure_width(&self, text: &str) -> Option<u32> {
        let (_, width) = self.layout(text);
        Some(width.ceil().max(0.0) as u32)
    }

    fn metric_height(&self) -> Option<f32> {
        Some(self.font.as_scaled(self.scale).height())
    }

    fn draw(
        &self,
        canvas: &mut RgbImage,
        center: (i32, i32),
        text: &str,
        color: Rgb<u8>,
    ) -> Result<(), DrawError> {
        let scaled = self.font.as_scaled(self.scale);
        let (glyphs, width) = self.layout(text);
        let left = center.0 as f32 - width / 2.0;
        let baseline = center.1 as f32 - scaled.height() / 2.0 + scaled.ascent();
        let (canvas_w, canvas_h) = canvas.dimensions();

        let mut painted = false;
        let mut outlined_any = false;
        for mut glyph in glyphs {
            glyph.position = point(glyph.position.x + left, baseline);
            let Some(outline) = self.font.outline_glyph(glyph) else {
                continue;
            };
            outlined_any = true;
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if x < 0 || y < 0 || x >= i64::from(canvas_w) || y >= i64::from(canvas_h) {
                    return;
                }
                blend(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
                painted = true;
            });
        }

        if outlined_any && !painted {
            return Err(DrawError::OffCanvas);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;

    #[test]
    fn test_blend_mixes_by_coverage() {
        let mut pixel = Rgb([0, 100, 200]);
        blend(&mut pixel, Rgb([255, 255, 255]), 0.5);
        assert_eq!(pixel, Rgb([128, 178, 228]));

        let mut pixel = Rgb([10, 20, 30]);
        blend(&mut pixel, Rgb([255, 0, 0]), 1.0);
        assert_eq!(pixel, Rgb([255, 0, 0]));
    }

    #[test]
    fn test_asset_fonts_missing_font_errors() {
        let assets = MemoryAssets::default();
        let fonts = AssetFonts(&assets);
        assert!(matches!(
            fonts.load(FontRole::Title, 12),
            Err(FontLoadError::Asset(_))
        ));
    }

    #[test]
    fn test_asset_fonts_garbage_font_errors() {
        let mut assets = MemoryAssets::default();
        assets.set_font(FontRole::Body, b"definitely not a font".to_vec());
        let fonts = AssetFonts(&assets);
        assert!(matches!(
            fonts.load(FontRole::Body, 12),
            Err(FontLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_default_fallback_is_builtin() {
        let assets = MemoryAssets::default();
        let face = AssetFonts(&assets).fallback(12).unwrap();
        assert!(face.measure_width("ABC").is_none());
        assert!(face.metric_height().is_none());
    }
}

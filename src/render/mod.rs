//! Caption compositor: draws a caption's title and body onto a poster.
//!
//! Each block is centred horizontally, word-wrapped to a box whose size is
//! a percentage of the image, and coloured to contrast with the pixel it
//! starts on. When either custom font can't be loaded both blocks fall back
//! to the built-in bitmap face, so a render only fails on bad image data.

mod builtin;
mod face;
mod layout;

pub use builtin::BuiltinFace;
pub use face::{AssetFonts, DrawError, Face, FontLoadError, FontSource, GlyphFace};
pub use layout::{BlockGeometry, ESTIMATED_CHAR_WIDTH, WRAP_MARGIN};

use crate::assets::{AssetStore, FontRole};
use crate::config::env_parse;
use crate::error::RenderError;
use crate::types::Caption;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// Title lines are always spaced at this multiple of the font size
pub const TITLE_LINE_HEIGHT: f32 = 1.2;

/// Placement of one text block, as percentages of the image
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    /// Top edge, percent of image height
    pub top_percent: f32,
    /// Wrap box width, percent of image width
    pub width_percent: f32,
    /// Font size, percent of image height
    pub font_size_percent: f32,
    /// Line spacing as a multiple of the font size
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub title: BlockStyle,
    pub body: BlockStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: BlockStyle {
                top_percent: 10.0,
                width_percent: 75.0,
                font_size_percent: 8.0,
                line_height: TITLE_LINE_HEIGHT,
            },
            body: BlockStyle {
                top_percent: 80.0,
                width_percent: 80.0,
                font_size_percent: 3.0,
                line_height: 1.2,
            },
        }
    }
}

impl RenderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            title: BlockStyle {
                top_percent: env_parse("TITLE_TOP_PERCENT", defaults.title.top_percent),
                width_percent: env_parse("TITLE_WIDTH_PERCENT", defaults.title.width_percent),
                font_size_percent: env_parse(
                    "TITLE_FONT_SIZE_PERCENT",
                    defaults.title.font_size_percent,
                ),
                line_height: TITLE_LINE_HEIGHT,
            },
            body: BlockStyle {
                top_percent: env_parse("BODY_TOP_PERCENT", defaults.body.top_percent),
                width_percent: env_parse("BODY_WIDTH_PERCENT", defaults.body.width_percent),
                font_size_percent: env_parse(
                    "BODY_FONT_SIZE_PERCENT",
                    defaults.body.font_size_percent,
                ),
                line_height: env_parse("BODY_LINE_HEIGHT", defaults.body.line_height),
            },
        };

        tracing::debug!(?config, "Render config loaded");
        config
    }
}

/// Faces for the title and body. Both come from the same source: a failure
/// on either custom font switches both blocks to the fallback.
fn acquire_faces(
    fonts: &dyn FontSource,
    title_px: u32,
    body_px: u32,
) -> Result<(Box<dyn Face>, Box<dyn Face>), RenderError> {
    let error = match (
        fonts.load(FontRole::Title, title_px),
        fonts.load(FontRole::Body, body_px),
    ) {
        (Ok(title), Ok(body)) => return Ok((title, body)),
        (Err(e), _) | (_, Err(e)) => e,
    };
    tracing::warn!("Could not load caption fonts ({}), using built-in font", error);

    let fallback = |px| {
        fonts.fallback(px).map_err(|e| {
            tracing::error!("Fallback font unavailable: {}", e);
            RenderError::NoUsableFont
        })
    };
    Ok((fallback(title_px)?, fallback(body_px)?))
}

fn draw_block(
    canvas: &mut RgbImage,
    lines: &[String],
    face: &dyn Face,
    geometry: &BlockGeometry,
    multiplier: f32,
    center_x: u32,
) {
    let color = layout::contrast_color(canvas, lines, face, geometry, multiplier, center_x);
    let mut y = geometry.top_y;

    for line in lines {
        let height = layout::line_height(face, line, geometry.font_px, multiplier);
        if !line.is_empty() {
            let center_y = y.saturating_add(height / 2);
            let center = (
                i32::try_from(center_x).unwrap_or(i32::MAX),
                i32::try_from(center_y).unwrap_or(i32::MAX),
            );
            if let Err(e) = face.draw(canvas, center, line, color) {
                tracing::debug!("Skipped caption line {:?}: {}", line, e);
            }
        }
        y = y.saturating_add(height);
    }
}

/// Draw `title` and `body` onto a copy of `poster`
pub fn compose(
    poster: &DynamicImage,
    title: &str,
    body: &str,
    config: &RenderConfig,
    fonts: &dyn FontSource,
) -> Result<RgbImage, RenderError> {
    let mut canvas = poster.to_rgb8();
    let (width, height) = canvas.dimensions();

    let title_geometry = BlockGeometry::derive(width, height, &config.title);
    let body_geometry = BlockGeometry::derive(width, height, &config.body);
    let (title_face, body_face) =
        acquire_faces(fonts, title_geometry.font_px, body_geometry.font_px)?;

    let center_x = width / 2;
    let title_lines = layout::layout_text(title, title_face.as_ref(), &title_geometry);
    let body_lines = layout::layout_text(body, body_face.as_ref(), &body_geometry);

    draw_block(
        &mut canvas,
        &title_lines,
        title_face.as_ref(),
        &title_geometry,
        config.title.line_height,
        center_x,
    );
    draw_block(
        &mut canvas,
        &body_lines,
        body_face.as_ref(),
        &body_geometry,
        config.body.line_height,
        center_x,
    );

    Ok(canvas)
}

pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Render a caption onto a stored poster and return PNG bytes
pub fn render_caption_png(
    assets: &dyn AssetStore,
    poster_id: &str,
    caption: &Caption,
    config: &RenderConfig,
) -> Result<Vec<u8>, RenderError> {
    let bytes = assets.poster_bytes(poster_id).map_err(|e| {
        tracing::warn!("Poster {} unavailable: {}", poster_id, e);
        RenderError::SourceImageNotFound(poster_id.to_string())
    })?;
    let poster = image::load_from_memory(&bytes)?;

    let canvas = compose(
        &poster,
        caption.title(),
        caption.body(),
        config,
        &AssetFonts(assets),
    )?;
    encode_png(&canvas)
}
